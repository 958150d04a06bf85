//! Analysis API client.
//!
//! One POST per request with a bounded wait; failures are classified
//! into [`AnalysisError`] at this boundary so the handler can map each
//! variant to its user-facing notice without inspecting strings.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use scanner_core::AnalysisPayload;

/// Fallback notice when a rejection body carries no message.
const GENERIC_FAILURE: &str = "Analysis failed";

/// Why an analysis fetch failed. Every variant is terminal for the
/// request — there is no retry policy.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The bounded wait elapsed before a response arrived.
    #[error("analysis request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("analysis service unreachable: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("analysis rejected: {message}")]
    Rejected { message: String },

    /// The success body did not decode as an analysis payload.
    #[error("analysis response malformed: {0}")]
    Decode(String),
}

/// Port through which the handler obtains an analysis payload.
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    async fn analyze(&self, token_address: &str) -> Result<AnalysisPayload, AnalysisError>;
}

/// HTTP client for the analysis service.
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(api_url: &str, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/analyze-token", api_url.trim_end_matches('/')),
            timeout,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Extract the server's failure message from a rejection body, falling
/// back to the generic notice for empty or non-JSON bodies.
fn rejection_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

fn from_reqwest(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::Timeout
    } else {
        AnalysisError::Network(err.to_string())
    }
}

#[async_trait]
impl AnalysisSource for AnalysisClient {
    async fn analyze(&self, token_address: &str) -> Result<AnalysisPayload, AnalysisError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "tokenAddress": token_address }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(AnalysisError::Rejected {
                message: rejection_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|err| AnalysisError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_server_text() {
        let body = br#"{"message": "Token not found on chain"}"#;
        assert_eq!(rejection_message(body), "Token not found on chain");
    }

    #[test]
    fn rejection_message_falls_back_on_missing_field() {
        assert_eq!(rejection_message(br#"{"error": "nope"}"#), GENERIC_FAILURE);
    }

    #[test]
    fn rejection_message_falls_back_on_garbage() {
        assert_eq!(rejection_message(b"<html>502</html>"), GENERIC_FAILURE);
        assert_eq!(rejection_message(b""), GENERIC_FAILURE);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = AnalysisClient::new("http://localhost:9000/api/", Duration::from_secs(1));
        assert_eq!(client.endpoint, "http://localhost:9000/api/analyze-token");
    }

    #[test]
    fn error_display_carries_detail() {
        let err = AnalysisError::Rejected {
            message: "Token not found".into(),
        };
        assert_eq!(err.to_string(), "analysis rejected: Token not found");
        assert_eq!(
            AnalysisError::Timeout.to_string(),
            "analysis request timed out"
        );
    }
}
