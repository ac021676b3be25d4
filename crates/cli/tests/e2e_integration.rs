//! End-to-end integration tests for the partybot pipeline.
//!
//! These tests drive a guest conversation from raw text through topic
//! detection, prompt composition, the completion provider, and the
//! conversation log, then read it back through the host dashboard and
//! the HTTP gateway.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use partybot_agent::{HostDashboard, SessionOrchestrator, SessionPhase};
use partybot_config::AppConfig;
use partybot_core::error::{ProviderError, TurnError};
use partybot_core::log::{ConversationLog, RecordRole};
use partybot_core::message::{Message, Role};
use partybot_core::provider::{Provider, ProviderRequest, ProviderResponse};
use partybot_core::topic::Topic;
use partybot_core::Backoff;
use partybot_store::{InMemoryLog, SqliteLog};

// ── Mock Provider ────────────────────────────────────────────────────────

/// Replays scripted replies in order and records every request it sees.
struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok("Sounds good!".into()));
        next.map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model,
        })
    }
}

fn orchestrator(
    provider: Arc<ScriptedProvider>,
    log: Arc<dyn ConversationLog>,
) -> SessionOrchestrator {
    SessionOrchestrator::from_config(&AppConfig::default(), provider, log)
}

fn system_prompt(request: &ProviderRequest) -> &str {
    let first = &request.messages[0];
    assert_eq!(first.role, Role::System);
    &first.content
}

fn known_line(topic: Topic, known: bool) -> String {
    format!("{} known: {known}", topic.label())
}

// ── Conversation pipeline ────────────────────────────────────────────────

#[tokio::test]
async fn conversation_persists_to_sqlite_and_feeds_the_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("party.db");

    let provider = Arc::new(ScriptedProvider::texts(&[
        "Nice! Anything you feel like eating?",
        "Pizza it is.",
        "Here is the plan: pizza at 9, beach after.",
    ]));

    {
        let log: Arc<dyn ConversationLog> = Arc::new(SqliteLog::open_file(&db_path).await.unwrap());
        let bot = orchestrator(provider.clone(), log.clone());

        assert_eq!(bot.phase("Asha").await, SessionPhase::Idle);
        bot.start_session("Asha").await.unwrap();
        assert_eq!(bot.phase("Asha").await, SessionPhase::AwaitingFirstMessage);

        let first = bot
            .handle_turn("Asha", "I'll reach around 8 from office")
            .await
            .unwrap();
        assert_eq!(first.reply, "Nice! Anything you feel like eating?");
        assert_eq!(first.learned, vec![Topic::ArrivalTime, Topic::OfficeStatus]);
        assert_eq!(first.phase, SessionPhase::Active);

        let second = bot.handle_turn("Asha", "pizza sounds nice").await.unwrap();
        assert_eq!(second.learned, vec![Topic::Dinner]);

        assert_eq!(log.count().await.unwrap(), 4);
    }

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);

    // Second request carries knowledge from the first turn and the whole history.
    let prompt = system_prompt(&requests[1]);
    assert!(prompt.contains(&known_line(Topic::ArrivalTime, true)));
    assert!(prompt.contains(&known_line(Topic::OfficeStatus, true)));
    assert!(prompt.contains(&known_line(Topic::Dinner, true)));
    assert!(prompt.contains(&known_line(Topic::Snacks, false)));
    assert_eq!(requests[1].messages.len(), 4);
    assert_eq!(
        requests[1]
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .count(),
        1
    );

    // A fresh process sees the same log.
    let reopened: Arc<dyn ConversationLog> =
        Arc::new(SqliteLog::open_file(&db_path).await.unwrap());
    let users = reopened.query_by_role(RecordRole::User).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].message, "I'll reach around 8 from office");
    let assistants = reopened.query_by_role(RecordRole::Assistant).await.unwrap();
    assert_eq!(assistants[1].message, "Pizza it is.");

    let dashboard = HostDashboard::from_config(&AppConfig::default(), reopened, provider.clone());
    let signals = dashboard.recent_signals().await.unwrap();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].guest, "Asha");
    assert_eq!(signals[0].messages.len(), 2);

    let plan = dashboard.generate_plan().await.unwrap();
    assert_eq!(plan, "Here is the plan: pizza at 9, beach after.");

    let plan_request = provider.requests().pop().unwrap();
    assert_eq!(plan_request.messages.len(), 1);
    assert!(plan_request.messages[0].content.contains("pizza sounds nice"));
}

#[tokio::test]
async fn guests_do_not_share_knowledge() {
    let provider = Arc::new(ScriptedProvider::texts(&[]));
    let log: Arc<dyn ConversationLog> = Arc::new(InMemoryLog::new());
    let bot = orchestrator(provider.clone(), log);

    bot.handle_turn("Asha", "bringing nachos").await.unwrap();
    bot.handle_turn("Ravi", "hello there").await.unwrap();

    let asha = bot.knowledge("Asha").await.unwrap();
    let ravi = bot.knowledge("Ravi").await.unwrap();
    assert!(asha.is_known(Topic::Snacks));
    assert!(!ravi.is_known(Topic::Snacks));

    let ravi_prompt = system_prompt(&provider.requests()[1]).to_string();
    assert!(ravi_prompt.contains(&known_line(Topic::Snacks, false)));
    assert_eq!(bot.guests().await, vec!["Asha".to_string(), "Ravi".to_string()]);
}

#[tokio::test]
async fn completion_failure_keeps_the_guest_message() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(
        ProviderError::AuthenticationFailed("bad key".into()),
    )]));
    let log: Arc<dyn ConversationLog> = Arc::new(InMemoryLog::new());
    let bot = SessionOrchestrator::builder(provider, log.clone())
        .storage_backoff(Backoff::none())
        .build();

    let err = bot
        .handle_turn("Asha", "I have to go early")
        .await
        .unwrap_err();
    assert!(matches!(err, TurnError::CompletionFailed { .. }));

    let users = log.query_by_role(RecordRole::User).await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(log.query_by_role(RecordRole::Assistant).await.unwrap().is_empty());
    assert!(bot.knowledge("Asha").await.unwrap().is_known(Topic::HardStop));
}

#[tokio::test]
async fn blank_input_touches_nothing() {
    let provider = Arc::new(ScriptedProvider::texts(&[]));
    let log: Arc<dyn ConversationLog> = Arc::new(InMemoryLog::new());
    let bot = orchestrator(provider.clone(), log.clone());

    let err = bot.handle_turn("Asha", "   ").await.unwrap_err();
    assert!(matches!(err, TurnError::InvalidInput(_)));
    assert!(bot.handle_turn("", "hi").await.is_err());

    assert!(provider.requests().is_empty());
    assert_eq!(log.count().await.unwrap(), 0);
}

// ── Gateway ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_chat_shows_up_in_host_signals() {
    let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::texts(&["See you at 9!"]));
    let log: Arc<dyn ConversationLog> = Arc::new(SqliteLog::new("sqlite::memory:").await.unwrap());
    let bot = Arc::new(SessionOrchestrator::from_config(
        &AppConfig::default(),
        provider.clone(),
        log.clone(),
    ));
    let host = Arc::new(HostDashboard::from_config(&AppConfig::default(), log, provider));
    let app = partybot_gateway::build_router(partybot_gateway::GatewayState::new(bot, host));

    let body = serde_json::json!({ "guest": "Meera", "message": "coming from office" });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["reply"], "See you at 9!");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/host/signals")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json[0]["guest"], "Meera");
    assert_eq!(json[0]["messages"][0], "coming from office");
}
