//! Minimal Telegram Bot API client.
//!
//! Long polling plus the two message operations the bot needs. Every
//! call posts JSON to `https://api.telegram.org/bot{token}/{method}` and
//! decodes the standard response envelope. This module is the single
//! place where provider error strings are classified into the typed
//! [`TransportError`] taxonomy — above here, only variants are checked.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use scanner_core::{ChatTransport, MessageRef, ParseMode, TransportError};

const API_BASE: &str = "https://api.telegram.org";
/// Timeout for ordinary (non-polling) API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Telegram's description for a redundant edit.
const NOT_MODIFIED_MARKER: &str = "message is not modified";

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// The standard Bot API response wrapper.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("{API_BASE}/bot{token}"),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<T, TransportError> {
        let url = format!("{}/{method}", self.base);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        let envelope: Envelope<T> = response.json().await.map_err(from_reqwest)?;
        if envelope.ok {
            envelope.result.ok_or_else(|| TransportError::Api {
                code: 0,
                description: format!("{method} returned an empty result"),
            })
        } else {
            let description = envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string());
            debug!(method, code = envelope.error_code, %description, "API call rejected");
            Err(classify_api_error(
                envelope.error_code.unwrap_or(0),
                description,
            ))
        }
    }

    /// Long-poll for updates past `offset`. The HTTP timeout exceeds the
    /// poll window so the server side closes the wait, not us.
    pub async fn get_updates(
        &self,
        offset: i64,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": poll_timeout.as_secs(),
                "allowed_updates": ["message"],
            }),
            poll_timeout + Duration::from_secs(10),
        )
        .await
    }
}

fn from_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Classify a Bot API rejection. The "message is not modified" string is
/// matched here and nowhere else.
fn classify_api_error(code: i64, description: String) -> TransportError {
    if description.to_lowercase().contains(NOT_MODIFIED_MARKER) {
        TransportError::NotModified
    } else {
        TransportError::Api { code, description }
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<MessageRef, TransportError> {
        let message: Message = self
            .call(
                "sendMessage",
                &json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": mode.as_str(),
                }),
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(MessageRef {
            chat_id: message.chat.id,
            message_id: message.message_id,
        })
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), TransportError> {
        // editMessageText echoes the edited message; the content is not
        // needed, only the ok/error split.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({
                    "chat_id": message.chat_id,
                    "message_id": message.message_id,
                    "text": text,
                    "parse_mode": mode.as_str(),
                }),
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(())
    }
}
