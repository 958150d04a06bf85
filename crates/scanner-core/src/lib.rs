//! Progressive reveal rendering core for the trench scanner bot.
//!
//! Everything here is transport-agnostic: the step catalog and payload
//! data model, the pure text formatters, the reveal-gated message
//! composer, and the timed sequencer that drives one editable chat
//! message through the reveal states. Network adapters live in the bot
//! crate and plug in through the [`transport::ChatTransport`] port.

pub mod compose;
pub mod format;
pub mod payload;
pub mod sequencer;
pub mod steps;
pub mod transport;

pub use compose::{render_message, RevealCursor};
pub use payload::{Analysis, AnalysisPayload, StepFinding, StepStatus};
pub use sequencer::{Pacing, RevealSequencer, SequencerState};
pub use steps::{StepCatalog, StepSpec};
pub use transport::{ChatTransport, MessageRef, ParseMode, TransportError};
