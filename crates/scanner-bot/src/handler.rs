//! Per-message request handling.
//!
//! One handler call per inbound text message, each on its own task.
//! Requests are independent and stateless: validate, send the
//! placeholder, fetch the analysis, then hand the payload to the reveal
//! sequencer. Every failure is terminal for the request and is reported
//! through one best-effort final edit.

use std::sync::Arc;

use tracing::{error, info, warn};

use scanner_core::{
    ChatTransport, MessageRef, Pacing, ParseMode, RevealSequencer, StepCatalog,
};

use crate::address::is_valid_token_address;
use crate::api::{AnalysisError, AnalysisSource};

const WELCOME: &str = "🤖 <b>Trench Scanner Bot</b>\n\n\
🔍 <b>AI-Powered Solana Token Analysis</b>\n\n\
I analyze Solana tokens and provide comprehensive risk assessments with market cap predictions.\n\n\
<b>How to use:</b>\n\
1. Send me a Solana token contract address\n\
2. I'll analyze it step-by-step\n\
3. Get detailed insights and predictions\n\n\
<b>Example:</b>\n\
<code>6V8q5kQkzokNwSxJv8W81zcKRUWsUW4c5Bf8suqipump</code>\n\n\
<b>Features:</b>\n\
• Real-time on-chain data analysis\n\
• AI-driven market cap predictions\n\
• Risk assessment (bundles, holders, dev activity)\n\
• Progressive step-by-step results\n\n\
Send a token address to get started! 🚀";

const INVALID_ADDRESS: &str = "❌ Invalid Solana address format!\n\n\
Please send a valid Solana token address (32-44 characters, base58).\n\n\
Example: <code>6V8q5kQkzokNwSxJv8W81zcKRUWsUW4c5Bf8suqipump</code>";

/// Handles one inbound message end to end.
pub struct RequestHandler<T, A> {
    transport: Arc<T>,
    analysis: Arc<A>,
    catalog: Arc<StepCatalog>,
    pacing: Pacing,
}

impl<T: ChatTransport, A: AnalysisSource> RequestHandler<T, A> {
    pub fn new(
        transport: Arc<T>,
        analysis: Arc<A>,
        catalog: Arc<StepCatalog>,
        pacing: Pacing,
    ) -> Self {
        Self {
            transport,
            analysis,
            catalog,
            pacing,
        }
    }

    /// Entry point for one inbound text message.
    pub async fn handle_text(&self, chat_id: i64, text: &str) {
        let text = text.trim();
        if text == "/start" {
            self.send_welcome(chat_id).await;
            return;
        }
        if text.starts_with('/') {
            // Unknown commands are ignored, matching the message filter.
            return;
        }
        self.handle_token_address(chat_id, text).await;
    }

    async fn send_welcome(&self, chat_id: i64) {
        if let Err(err) = self
            .transport
            .send_message(chat_id, WELCOME, ParseMode::Html)
            .await
        {
            warn!(chat_id, %err, "failed to send welcome message");
        }
    }

    async fn handle_token_address(&self, chat_id: i64, address: &str) {
        if !is_valid_token_address(address) {
            if let Err(err) = self
                .transport
                .send_message(chat_id, INVALID_ADDRESS, ParseMode::Html)
                .await
            {
                warn!(chat_id, %err, "failed to send validation reply");
            }
            return;
        }

        let placeholder =
            format!("🔍 Analyzing Token...\n`{address}`\n\n⏳ Connecting to Solana...");
        let message = match self
            .transport
            .send_message(chat_id, &placeholder, ParseMode::Markdown)
            .await
        {
            Ok(message) => message,
            Err(err) => {
                error!(chat_id, %err, "failed to create analysis message");
                return;
            }
        };

        info!(chat_id, address, "analysis request started");

        let payload = match self.analysis.analyze(address).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(chat_id, address, %err, "analysis fetch failed");
                self.report(&message, &fetch_failure_notice(&err)).await;
                return;
            }
        };

        let sequencer = RevealSequencer::new(self.transport.as_ref(), &self.catalog, self.pacing);
        match sequencer.run(&message, address, &payload).await {
            Ok(()) => info!(chat_id, address, "analysis delivered"),
            Err(err) => {
                error!(chat_id, address, %err, "reveal sequence failed");
                self.report(
                    &message,
                    &format!("❌ Unexpected Error\n\nError: {err}\n\nPlease try again later."),
                )
                .await;
            }
        }
    }

    /// Best-effort terminal edit; a failure here is only logged.
    async fn report(&self, message: &MessageRef, text: &str) {
        if let Err(err) = self
            .transport
            .edit_message(message, text, ParseMode::Markdown)
            .await
        {
            warn!(message = %message, %err, "failed to deliver failure notice");
        }
    }
}

/// User-facing notice for each fetch failure class.
fn fetch_failure_notice(err: &AnalysisError) -> String {
    match err {
        AnalysisError::Timeout => "⏱️ Request Timeout\n\n\
            The analysis is taking longer than expected. Please try again."
            .to_string(),
        AnalysisError::Network(detail) => format!(
            "❌ Network Error\n\n\
             Failed to connect to analysis service.\n\
             Error: {detail}\n\n\
             Please try again later."
        ),
        AnalysisError::Rejected { message } => format!(
            "❌ Analysis Failed\n\n\
             Error: {message}\n\n\
             Please try again later."
        ),
        AnalysisError::Decode(detail) => format!(
            "❌ Unexpected Error\n\n\
             Error: {detail}\n\n\
             Please try again later."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_notice_is_distinct() {
        let notice = fetch_failure_notice(&AnalysisError::Timeout);
        assert!(notice.contains("Request Timeout"));
        assert!(!notice.contains("Network Error"));
    }

    #[test]
    fn rejection_notice_carries_server_message() {
        let notice = fetch_failure_notice(&AnalysisError::Rejected {
            message: "Token not found on chain".into(),
        });
        assert!(notice.contains("Analysis Failed"));
        assert!(notice.contains("Token not found on chain"));
    }

    #[test]
    fn network_notice_carries_detail() {
        let notice = fetch_failure_notice(&AnalysisError::Network("connection refused".into()));
        assert!(notice.contains("Network Error"));
        assert!(notice.contains("connection refused"));
    }
}
