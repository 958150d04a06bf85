//! End-to-end request handling over in-process fakes.
//!
//! Drives `RequestHandler` with a recording transport and a scripted
//! analysis source, under tokio's paused clock so the reveal pacing
//! costs no wall time.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use scanner_bot::api::{AnalysisError, AnalysisSource};
use scanner_bot::handler::RequestHandler;
use scanner_core::{
    AnalysisPayload, ChatTransport, MessageRef, Pacing, ParseMode, StepCatalog, TransportError,
};

const ADDRESS: &str = "6V8q5kQkzokNwSxJv8W81zcKRUWsUW4c5Bf8suqipump";

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Send {
        chat_id: i64,
        text: String,
        mode: ParseMode,
    },
    Edit {
        text: String,
        mode: ParseMode,
    },
}

/// Recording transport; can fail a chosen edit call.
struct FakeTransport {
    ops: Mutex<Vec<Op>>,
    edit_failures: Mutex<Vec<Option<TransportError>>>,
}

impl FakeTransport {
    fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            edit_failures: Mutex::new(Vec::new()),
        }
    }

    fn fail_edit(self, call: usize, error: TransportError) -> Self {
        {
            let mut failures = self.edit_failures.lock().unwrap();
            while failures.len() < call {
                failures.push(None);
            }
            failures[call - 1] = Some(error);
        }
        self
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    fn edits(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Edit { text, .. } => Some(text),
                Op::Send { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<MessageRef, TransportError> {
        self.ops.lock().unwrap().push(Op::Send {
            chat_id,
            text: text.to_string(),
            mode,
        });
        Ok(MessageRef {
            chat_id,
            message_id: 1,
        })
    }

    async fn edit_message(
        &self,
        _message: &MessageRef,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), TransportError> {
        let call = {
            let mut ops = self.ops.lock().unwrap();
            ops.push(Op::Edit {
                text: text.to_string(),
                mode,
            });
            ops.iter().filter(|op| matches!(op, Op::Edit { .. })).count()
        };
        let mut failures = self.edit_failures.lock().unwrap();
        if let Some(slot) = failures.get_mut(call - 1) {
            if let Some(err) = slot.take() {
                return Err(err);
            }
        }
        Ok(())
    }
}

/// One-shot scripted analysis source.
struct FakeAnalysis {
    result: Mutex<Option<Result<AnalysisPayload, AnalysisError>>>,
}

impl FakeAnalysis {
    fn returning(result: Result<AnalysisPayload, AnalysisError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
        }
    }
}

#[async_trait]
impl AnalysisSource for FakeAnalysis {
    async fn analyze(&self, _token_address: &str) -> Result<AnalysisPayload, AnalysisError> {
        self.result
            .lock()
            .unwrap()
            .take()
            .expect("analyze called more than once")
    }
}

fn payload_with_verdict() -> AnalysisPayload {
    serde_json::from_value(serde_json::json!({
        "metadata": {"name": "Trench Coin", "symbol": "TRENCH"},
        "metrics": {"marketCap": 2500000, "volume24h": 500},
        "analysis": {
            "bundles": {"value": "clean", "status": "safe", "reason": "no bundles"},
            "devHistory": {"value": "2 rugs", "status": "danger", "reason": "serial deployer"},
            "overallProbability": 42,
            "riskLevel": "Medium",
            "recommendation": "Watch the dev wallet"
        }
    }))
    .unwrap()
}

fn handler(
    transport: Arc<FakeTransport>,
    analysis: FakeAnalysis,
) -> RequestHandler<FakeTransport, FakeAnalysis> {
    RequestHandler::new(
        transport,
        Arc::new(analysis),
        Arc::new(StepCatalog::default()),
        Pacing::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn start_command_sends_welcome() {
    let transport = Arc::new(FakeTransport::new());
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Ok(AnalysisPayload::default())),
    );

    handler.handle_text(7, "/start").await;

    let ops = transport.ops();
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        Op::Send { text, mode, .. } => {
            assert!(text.contains("Trench Scanner Bot"));
            assert_eq!(*mode, ParseMode::Html);
        }
        other => panic!("expected a send, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unknown_commands_are_ignored() {
    let transport = Arc::new(FakeTransport::new());
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Ok(AnalysisPayload::default())),
    );

    handler.handle_text(7, "/help").await;
    assert!(transport.ops().is_empty());
}

#[tokio::test(start_paused = true)]
async fn invalid_address_gets_usage_reply() {
    let transport = Arc::new(FakeTransport::new());
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Ok(AnalysisPayload::default())),
    );

    handler.handle_text(7, "definitely-not-an-address").await;

    let ops = transport.ops();
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        Op::Send { text, mode, .. } => {
            assert!(text.contains("Invalid Solana address"));
            assert_eq!(*mode, ParseMode::Html);
        }
        other => panic!("expected a send, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn successful_request_reveals_to_the_verdict() {
    let transport = Arc::new(FakeTransport::new());
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Ok(payload_with_verdict())),
    );

    handler.handle_text(7, ADDRESS).await;

    let ops = transport.ops();
    match &ops[0] {
        Op::Send { text, mode, chat_id } => {
            assert_eq!(*chat_id, 7);
            assert!(text.contains("Connecting to Solana"));
            assert!(text.contains(ADDRESS));
            assert_eq!(*mode, ParseMode::Markdown);
        }
        other => panic!("expected the placeholder send, got {other:?}"),
    }

    // Reveal zero, two step reveals, then the verdict.
    let edits = transport.edits();
    assert_eq!(edits.len(), 4);
    assert!(edits[0].contains("Token Overview"));
    assert!(!edits[0].contains("Bundle Detection"));
    assert!(edits[1].contains("Bundle Detection"));
    assert!(edits[2].contains("Developer History"));
    assert!(edits[3].contains("Overall Verdict"));
    assert!(edits[3].contains("Win Probability: 42%"));
}

#[tokio::test(start_paused = true)]
async fn fetch_timeout_is_reported_distinctly() {
    let transport = Arc::new(FakeTransport::new());
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Err(AnalysisError::Timeout)),
    );

    handler.handle_text(7, ADDRESS).await;

    let edits = transport.edits();
    assert_eq!(edits.len(), 1);
    assert!(edits[0].contains("Request Timeout"));
}

#[tokio::test(start_paused = true)]
async fn rejection_reports_the_server_message() {
    let transport = Arc::new(FakeTransport::new());
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Err(AnalysisError::Rejected {
            message: "Token not found on chain".into(),
        })),
    );

    handler.handle_text(7, ADDRESS).await;

    let edits = transport.edits();
    assert_eq!(edits.len(), 1);
    assert!(edits[0].contains("Analysis Failed"));
    assert!(edits[0].contains("Token not found on chain"));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_ends_with_an_unexpected_error_notice() {
    // The second edit (first step reveal) fails hard.
    let transport = Arc::new(FakeTransport::new().fail_edit(
        2,
        TransportError::Api {
            code: 403,
            description: "Forbidden: bot was blocked by the user".into(),
        },
    ));
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Ok(payload_with_verdict())),
    );

    handler.handle_text(7, ADDRESS).await;

    let edits = transport.edits();
    // Reveal zero, the failing step edit, then the failure notice.
    assert_eq!(edits.len(), 3);
    assert!(edits[2].contains("Unexpected Error"));
    assert!(edits[2].contains("403"));
}

#[tokio::test(start_paused = true)]
async fn benign_edit_rejection_does_not_stop_the_reveal() {
    let transport = Arc::new(FakeTransport::new().fail_edit(2, TransportError::NotModified));
    let handler = handler(
        transport.clone(),
        FakeAnalysis::returning(Ok(payload_with_verdict())),
    );

    handler.handle_text(7, ADDRESS).await;

    let edits = transport.edits();
    assert_eq!(edits.len(), 4);
    assert!(edits[3].contains("Overall Verdict"));
}
