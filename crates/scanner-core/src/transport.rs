//! Chat transport port.
//!
//! The sequencer only needs two operations — create a message and edit
//! it — so the transport is a narrow async trait. Adapters classify
//! provider-specific failures into [`TransportError`] once, at the
//! boundary; everything above checks the typed variant.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque handle to a message the bot created and may edit later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

/// Markup mode for outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
        }
    }
}

/// Typed transport failure taxonomy.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The edit was rejected because the content is already identical.
    /// Benign: the message on screen is exactly what we wanted.
    #[error("message content unchanged")]
    NotModified,

    /// The provider rejected the request.
    #[error("chat API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Connection-level failure before a response arrived.
    #[error("chat network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("chat request timed out")]
    Timeout,
}

impl TransportError {
    /// True exactly for the idempotent no-op rejection; the sequencer
    /// proceeds as if the edit succeeded.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NotModified)
    }
}

/// Operations the reveal sequencer needs from the chat transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Create a new message, returning a handle for later edits.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<MessageRef, TransportError>;

    /// Replace the text of a previously created message.
    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), TransportError>;
}
