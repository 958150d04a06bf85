//! Pure text-block formatters.
//!
//! Every function here is total: given partially-empty input it renders
//! placeholder text, never panics, and touches no external state. Panel
//! geometry (box widths, truncation bounds, wrap width) is fixed so the
//! panels line up in Telegram's monospace rendering.

use crate::payload::{
    Analysis, Predictions, RiskLevel, Scenario, StepFinding, StepStatus, TokenMetadata,
    TokenMetrics,
};
use crate::steps::StepCatalog;

/// Reasons longer than this are cut to 67 chars plus an ellipsis.
const REASON_MAX: usize = 70;
/// Greedy word-wrap width for step reasons.
const WRAP_WIDTH: usize = 27;
/// Cells in the progress bar.
const BAR_CELLS: usize = 20;
/// Recommendations longer than this are cut to 147 chars plus an ellipsis.
const RECOMMENDATION_MAX: usize = 150;

/// Compact currency rendering: `$2.50M`, `$1.5K`, `$500`, `$0`.
pub fn currency(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v != 0.0 => v,
        _ => return "$0".to_string(),
    };
    if v >= 1_000_000.0 {
        format!("${:.2}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("${:.1}K", v / 1_000.0)
    } else {
        format!("${v:.0}")
    }
}

/// Truncate to at most `max` characters (no ellipsis).
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        text.chars().take(max).collect()
    } else {
        text.to_string()
    }
}

/// Truncate to `max - 3` characters plus `...` when longer than `max`.
fn clip_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut out: String = text.chars().take(max - 3).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}

/// Greedy word-wrap into lines of at most `WRAP_WIDTH` characters,
/// joined with the step panel's three-space continuation indent.
fn wrap_reason(text: &str) -> String {
    let mut wrapped = String::new();
    let mut line = String::new();
    let mut line_chars = 0usize;
    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if line_chars + word_chars <= WRAP_WIDTH {
            line.push_str(word);
            line.push(' ');
            line_chars += word_chars + 1;
        } else {
            if !line.is_empty() {
                wrapped.push_str(line.trim_end());
                wrapped.push_str("\n   ");
            }
            line.clear();
            line.push_str(word);
            line.push(' ');
            line_chars = word_chars + 1;
        }
    }
    wrapped.push_str(line.trim_end());
    wrapped
}

/// Render a number the way the chat UI shows it: whole values without a
/// trailing `.0`.
fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// The boxed token overview panel.
pub fn overview(metadata: &TokenMetadata, metrics: &TokenMetrics) -> String {
    let name = clip(metadata.name.as_deref().unwrap_or("Unknown"), 25);
    let symbol = clip(metadata.symbol.as_deref().unwrap_or("N/A"), 23);
    let market_cap = currency(metrics.market_cap);
    let volume = currency(metrics.volume_24h);
    let liquidity = currency(metrics.liquidity_usd);

    format!(
        "📊 Token Overview\n\
         ┌─────────────────────────────┐\n\
         │ Name: {name:<25} │\n\
         │ Symbol: {symbol:<23} │\n\
         │ Market Cap: {market_cap:<18} │\n\
         │ Volume 24h: {volume:<19} │\n\
         │ Liquidity: {liquidity:<20} │\n\
         └─────────────────────────────┘"
    )
}

fn status_glyph(status: Option<StepStatus>) -> &'static str {
    match status {
        Some(StepStatus::Safe) => "✅",
        Some(StepStatus::Warning) => "⚠️",
        Some(StepStatus::Danger) => "❌",
        Some(StepStatus::Info) | Some(StepStatus::Neutral) | None => "ℹ️",
    }
}

/// One analysis-step panel. Empty when the key is not in the catalog.
pub fn step(catalog: &StepCatalog, key: &str, finding: &StepFinding) -> String {
    let Some(spec) = catalog.find(key) else {
        return String::new();
    };

    let glyph = status_glyph(finding.status);
    let value = finding.value.as_deref().unwrap_or("N/A");
    let reason = clip_ellipsis(finding.reason.as_deref().unwrap_or(""), REASON_MAX);
    let wrapped = wrap_reason(&reason);

    format!(
        "\n{} {}\n   {} {}\n   {}",
        spec.icon, spec.label, glyph, value, wrapped
    )
}

fn scenario_block(scenario: Option<&Scenario>) -> String {
    let empty = Scenario::default();
    let s = scenario.unwrap_or(&empty);
    let target = currency(s.mcap);
    let multiplier = s.multiplier.as_deref().unwrap_or("N/A");
    let probability = number(s.probability.unwrap_or(0.0));
    let timeframe = s.timeframe.as_deref().unwrap_or("N/A");
    format!(
        "│    Target: {target:<18} │\n\
         │    Multiplier: {multiplier:<15} │\n\
         │    Probability: {probability}%            │\n\
         │    Timeframe: {timeframe:<16} │"
    )
}

/// The boxed market-cap predictions panel. Empty when no block exists.
pub fn predictions(block: Option<&Predictions>) -> String {
    let Some(block) = block else {
        return String::new();
    };

    format!(
        "\n📈 Market Cap Predictions\n\
         ┌─────────────────────────────┐\n\
         │ 🟢 Conservative             │\n\
         {}\n\
         ├─────────────────────────────┤\n\
         │ 🟡 Moderate                 │\n\
         {}\n\
         ├─────────────────────────────┤\n\
         │ 🔴 Aggressive               │\n\
         {}\n\
         └─────────────────────────────┘",
        scenario_block(block.conservative.as_ref()),
        scenario_block(block.moderate.as_ref()),
        scenario_block(block.aggressive.as_ref()),
    )
}

fn risk_glyph(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "🟢",
        RiskLevel::Medium => "🟡",
        RiskLevel::High => "🔴",
    }
}

/// The boxed overall-verdict panel.
pub fn verdict(analysis: &Analysis) -> String {
    let probability = number(analysis.overall_probability.unwrap_or(0.0));
    let level = analysis.risk_level.unwrap_or(RiskLevel::Medium);
    let recommendation = clip_ellipsis(
        analysis.recommendation.as_deref().unwrap_or(""),
        RECOMMENDATION_MAX,
    );
    let level_text = level.to_string();

    format!(
        "\n🎯 Overall Verdict\n\
         ┌─────────────────────────────┐\n\
         │ Win Probability: {probability}%        │\n\
         │ Risk Level: {} {level_text:<18} │\n\
         ├─────────────────────────────┤\n\
         │ {recommendation:<27} │\n\
         └─────────────────────────────┘",
        risk_glyph(level)
    )
}

/// 20-cell progress bar with a truncated percentage.
///
/// `total` is the catalog length and is always ≥ 1; passing zero is a
/// caller contract violation.
pub fn progress_bar(current: usize, total: usize) -> String {
    let filled = current * BAR_CELLS / total;
    let percentage = current * 100 / total;
    format!(
        "[{}{}] {percentage}%",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled)
    )
}
