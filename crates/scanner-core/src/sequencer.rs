//! Timed reveal sequencer.
//!
//! Drives one editable chat message through the reveal states for a
//! payload that was fetched in full up front. Every transition is
//! checked against the legal-transition guard, so an ordering bug shows
//! up as an [`IllegalTransition`] instead of a scrambled chat message.
//!
//! One sequencer instance serves exactly one inbound request; it is not
//! resumable and holds no state across requests.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::compose::{render_message, RevealCursor};
use crate::payload::AnalysisPayload;
use crate::steps::StepCatalog;
use crate::transport::{ChatTransport, MessageRef, ParseMode, TransportError};

/// Inter-step pacing for the reveal sequence.
///
/// The payload is already complete when the sequence starts; the delays
/// are presentation pacing, owned by configuration so hosts (and tests)
/// can collapse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay before each step reveal and before the predictions panel.
    pub step_delay: Duration,
    /// Delay before the final verdict panel.
    pub verdict_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_secs(3),
            verdict_delay: Duration::from_secs(2),
        }
    }
}

/// States of the reveal sequence.
///
/// Every run starts at `Init` and terminates at `Done`. `Stepping(i)`
/// means steps up to index `i` (1-based) have been revealed; indices
/// only move forward, skipping steps the payload has no finding for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Init,
    Stepping(usize),
    PredictionsShown,
    VerdictShown,
    Done,
}

impl SequencerState {
    /// Whether this is a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition(self, to: SequencerState) -> bool {
        use SequencerState::*;

        // Any non-terminal state may finish the sequence.
        if to == Done && !self.is_terminal() {
            return true;
        }

        match (self, to) {
            (Init, Stepping(i)) => i >= 1,
            (Stepping(i), Stepping(j)) => j > i,
            (Init | Stepping(_), PredictionsShown) => true,
            (Init | Stepping(_) | PredictionsShown, VerdictShown) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "Init"),
            Self::Stepping(i) => write!(f, "Stepping({i})"),
            Self::PredictionsShown => write!(f, "PredictionsShown"),
            Self::VerdictShown => write!(f, "VerdictShown"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Attempted transition that the state graph does not allow.
#[derive(Debug, Clone, Error)]
#[error("illegal sequencer transition: {from} → {to}")]
pub struct IllegalTransition {
    pub from: SequencerState,
    pub to: SequencerState,
}

/// Failure of a reveal sequence.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    State(#[from] IllegalTransition),
}

/// Current state plus the transition guard.
struct Machine {
    current: SequencerState,
}

impl Machine {
    fn new() -> Self {
        Self {
            current: SequencerState::Init,
        }
    }

    fn advance(&mut self, to: SequencerState) -> Result<(), IllegalTransition> {
        if !self.current.can_transition(to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }
        debug!(from = %self.current, to = %to, "sequencer transition");
        self.current = to;
        Ok(())
    }
}

/// Drives the timed reveal of one analysis payload against one message.
pub struct RevealSequencer<'a, T: ChatTransport + ?Sized> {
    transport: &'a T,
    catalog: &'a StepCatalog,
    pacing: Pacing,
}

impl<'a, T: ChatTransport + ?Sized> RevealSequencer<'a, T> {
    pub fn new(transport: &'a T, catalog: &'a StepCatalog, pacing: Pacing) -> Self {
        Self {
            transport,
            catalog,
            pacing,
        }
    }

    /// Run the full sequence against a previously created message.
    ///
    /// The first edit replaces the placeholder with the reveal-zero
    /// render; each later tick reveals at most one step panel. A benign
    /// redundant-edit rejection is swallowed; any other transport error
    /// ends the sequence.
    pub async fn run(
        &self,
        message: &MessageRef,
        token_address: &str,
        payload: &AnalysisPayload,
    ) -> Result<(), SequencerError> {
        let mut machine = Machine::new();
        let mut cursor = RevealCursor::start();
        let analysis = &payload.analysis;

        self.push(message, token_address, payload, &cursor).await?;

        for (index, spec) in self.catalog.iter().enumerate() {
            sleep(self.pacing.step_delay).await;

            // The reveal index only moves when there is a finding to
            // show; missing steps cost a tick but no edit.
            if analysis.finding(&spec.key).is_none() {
                continue;
            }
            machine.advance(SequencerState::Stepping(index + 1))?;
            cursor.advance_to(index + 1, self.catalog);
            self.push(message, token_address, payload, &cursor).await?;
        }

        if analysis.market_cap_predictions.is_some() {
            sleep(self.pacing.step_delay).await;
            machine.advance(SequencerState::PredictionsShown)?;
            cursor.reveal_predictions(self.catalog);
            self.push(message, token_address, payload, &cursor).await?;
        }

        if analysis.has_verdict() {
            sleep(self.pacing.verdict_delay).await;
            machine.advance(SequencerState::VerdictShown)?;
            cursor.reveal_verdict(self.catalog);
            self.push(message, token_address, payload, &cursor).await?;
        }

        machine.advance(SequencerState::Done)?;
        Ok(())
    }

    /// Edit the message, treating a redundant-edit rejection as success.
    async fn push(
        &self,
        message: &MessageRef,
        token_address: &str,
        payload: &AnalysisPayload,
        cursor: &RevealCursor,
    ) -> Result<(), TransportError> {
        let text = render_message(token_address, payload, self.catalog, cursor);
        match self
            .transport
            .edit_message(message, &text, ParseMode::Markdown)
            .await
        {
            Err(err) if err.is_benign() => {
                debug!(message = %message, "edit skipped, content unchanged");
                Ok(())
            }
            other => other,
        }
    }
}
