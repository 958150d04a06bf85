//! Reveal-gated message assembly.
//!
//! The whole payload is available up front; what creates the progressive
//! effect is the [`RevealCursor`] withholding step panels past the
//! current reveal index. Rendering the same inputs twice yields
//! byte-identical output, which is what lets the sequencer lean on the
//! transport's redundant-edit rejection.

use crate::format;
use crate::payload::AnalysisPayload;
use crate::steps::StepCatalog;

/// Mutable cursor of the reveal sequence.
///
/// `steps_shown` never exceeds the catalog length, and the predictions /
/// verdict flags are only set once every step has been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealCursor {
    /// Steps at index `< steps_shown` are visible.
    pub steps_shown: usize,
    /// Predictions panel revealed (cursor held at the catalog length).
    pub show_predictions: bool,
    /// Verdict panel revealed; also forces the completed layout.
    pub show_verdict: bool,
}

impl RevealCursor {
    /// Cursor at reveal index zero: header and overview only.
    pub fn start() -> Self {
        Self::default()
    }

    /// Advance the reveal index, clamped to the catalog length.
    pub fn advance_to(&mut self, index: usize, catalog: &StepCatalog) {
        self.steps_shown = index.min(catalog.len());
    }

    /// Reveal the predictions panel. Pins the index to the catalog
    /// length so panels cannot appear out of order.
    pub fn reveal_predictions(&mut self, catalog: &StepCatalog) {
        self.steps_shown = catalog.len();
        self.show_predictions = true;
    }

    /// Reveal the verdict panel and switch to the completed layout.
    pub fn reveal_verdict(&mut self, catalog: &StepCatalog) {
        self.steps_shown = catalog.len();
        self.show_verdict = true;
    }
}

/// Assemble the full message body for the current reveal state.
pub fn render_message(
    token_address: &str,
    payload: &AnalysisPayload,
    catalog: &StepCatalog,
    cursor: &RevealCursor,
) -> String {
    let display_address = if token_address.chars().count() > 20 {
        format!("{}...", token_address.chars().take(20).collect::<String>())
    } else {
        token_address.to_string()
    };

    let mut lines: Vec<String> = vec![
        "🔍 Analyzing Token".to_string(),
        format!("`{display_address}`"),
        String::new(),
        format::overview(&payload.metadata, &payload.metrics),
    ];

    let analysis = &payload.analysis;
    if !analysis.is_empty() {
        let total = catalog.len();

        let mut panels = Vec::new();
        for (index, spec) in catalog.iter().enumerate() {
            if index >= cursor.steps_shown {
                break;
            }
            if let Some(finding) = analysis.finding(&spec.key) {
                panels.push(format::step(catalog, &spec.key, finding));
            }
        }
        if !panels.is_empty() {
            lines.push("\n📋 Analysis Results:".to_string());
            lines.extend(panels);
        }

        if cursor.steps_shown < total && !cursor.show_verdict {
            lines.push(format!(
                "\n⏳ Analyzing... ({}/{})",
                cursor.steps_shown, total
            ));
            lines.push(format::progress_bar(cursor.steps_shown, total));
        }

        if cursor.steps_shown >= total || cursor.show_predictions || cursor.show_verdict {
            if let Some(block) = analysis.market_cap_predictions.as_ref() {
                lines.push(format::predictions(Some(block)));
            }
        }

        if cursor.show_verdict && analysis.has_verdict() {
            lines.push(format::verdict(analysis));
        }
    }

    lines.join("\n")
}
