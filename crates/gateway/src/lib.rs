//! HTTP API gateway for partybot.
//!
//! Exposes the guest chat and the host dashboard over REST.
//!
//! Built on Axum for high performance async HTTP.

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use partybot_agent::{GuestSignals, HostDashboard, SessionOrchestrator, SessionPhase, SnackPlan};
use partybot_core::error::{HostError, TurnError};
use partybot_core::message::Role;
use partybot_core::topic::Topic;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<SessionOrchestrator>,
    pub host: Arc<HostDashboard>,
    pub start_time: DateTime<Utc>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(orchestrator: Arc<SessionOrchestrator>, host: Arc<HostDashboard>) -> SharedState {
        Arc::new(Self {
            orchestrator,
            host,
            start_time: Utc::now(),
        })
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/greeting", get(greeting_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/guests", get(guests_handler))
        .route("/v1/guests/{guest}/knowledge", get(knowledge_handler))
        .route("/v1/guests/{guest}/transcript", get(transcript_handler))
        .route("/v1/host/signals", get(signals_handler))
        .route("/v1/host/snacks", get(snacks_handler))
        .route("/v1/host/plan", post(plan_handler))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: partybot_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let router = partybot_providers::router::build_from_config(&config);
    let provider = router
        .default()
        .ok_or("No default provider configured, set an API key")?;
    let log = partybot_store::open_from_config(&config.storage).await?;

    let orchestrator = Arc::new(SessionOrchestrator::from_config(
        &config,
        provider.clone(),
        log.clone(),
    ));
    let host = Arc::new(HostDashboard::from_config(&config, log, provider));
    let app = build_router(GatewayState::new(orchestrator, host));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- DTOs ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    sessions: usize,
    uptime_secs: i64,
}

#[derive(Serialize)]
struct GreetingResponse {
    greeting: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    guest: String,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    guest: String,
    turn_id: String,
    reply: String,
    knowledge: Vec<TopicDto>,
    learned: Vec<Topic>,
    phase: SessionPhase,
}

#[derive(Serialize)]
struct TopicDto {
    topic: Topic,
    label: &'static str,
    known: bool,
}

#[derive(Serialize)]
struct GuestSummary {
    guest: String,
    phase: SessionPhase,
    known_topics: usize,
}

#[derive(Serialize)]
struct KnowledgeResponse {
    guest: String,
    phase: SessionPhase,
    /// Every topic is covered
    complete: bool,
    topics: Vec<TopicDto>,
}

#[derive(Serialize)]
struct MessageDto {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct TranscriptResponse {
    guest: String,
    messages: Vec<MessageDto>,
}

#[derive(Deserialize)]
struct SnackQuery {
    guests: Option<u32>,
}

#[derive(Serialize)]
struct SnackResponse {
    guests: u32,
    #[serde(flatten)]
    plan: SnackPlan,
}

#[derive(Serialize)]
struct PlanResponse {
    plan: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            reply: None,
        }),
    )
}

fn topics(knowledge: &partybot_core::KnowledgeState) -> Vec<TopicDto> {
    knowledge
        .iter()
        .map(|(topic, known)| TopicDto {
            topic,
            label: topic.label(),
            known,
        })
        .collect()
}

fn host_error(e: HostError) -> ApiError {
    match e {
        HostError::Storage(e) => {
            error!(error = %e, "Host dashboard storage failure");
            api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        HostError::CompletionFailed(e) => {
            warn!(error = %e, "Plan generation failed");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

// --- Handlers ---

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.orchestrator.session_count().await,
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
    })
}

async fn greeting_handler(State(state): State<SharedState>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        greeting: state.orchestrator.greeting().to_string(),
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    info!(guest = %payload.guest, "v1/chat request");

    match state
        .orchestrator
        .handle_turn(&payload.guest, &payload.message)
        .await
    {
        Ok(outcome) => Ok(Json(ChatResponse {
            knowledge: topics(&outcome.knowledge),
            guest: outcome.guest,
            turn_id: outcome.turn_id,
            reply: outcome.reply,
            learned: outcome.learned,
            phase: outcome.phase,
        })
        .into_response()),
        Err(TurnError::InvalidInput(_)) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e @ TurnError::CompletionFailed { .. }) => {
            Err(api_error(StatusCode::BAD_GATEWAY, e.to_string()))
        }
        Err(TurnError::StorageUnavailable { source, reply }) => {
            error!(error = %source, "Conversation log unavailable");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: source.to_string(),
                    reply,
                }),
            ))
        }
    }
}

async fn guests_handler(State(state): State<SharedState>) -> Json<Vec<GuestSummary>> {
    let mut summaries = Vec::new();
    for guest in state.orchestrator.guests().await {
        let phase = state.orchestrator.phase(&guest).await;
        let known_topics = state
            .orchestrator
            .knowledge(&guest)
            .await
            .map(|k| k.known_count())
            .unwrap_or(0);
        summaries.push(GuestSummary {
            guest,
            phase,
            known_topics,
        });
    }
    Json(summaries)
}

async fn knowledge_handler(
    State(state): State<SharedState>,
    Path(guest): Path<String>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let knowledge = state
        .orchestrator
        .knowledge(&guest)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("No session for '{guest}'")))?;

    Ok(Json(KnowledgeResponse {
        phase: state.orchestrator.phase(&guest).await,
        complete: knowledge.is_complete(),
        topics: topics(&knowledge),
        guest,
    }))
}

async fn transcript_handler(
    State(state): State<SharedState>,
    Path(guest): Path<String>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let messages = state
        .orchestrator
        .transcript(&guest)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("No session for '{guest}'")))?;

    Ok(Json(TranscriptResponse {
        guest,
        messages: messages
            .into_iter()
            .map(|m| MessageDto {
                role: m.role,
                content: m.content,
                timestamp: m.timestamp,
            })
            .collect(),
    }))
}

async fn signals_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GuestSignals>>, ApiError> {
    state
        .host
        .recent_signals()
        .await
        .map(Json)
        .map_err(host_error)
}

async fn snacks_handler(
    State(state): State<SharedState>,
    Query(query): Query<SnackQuery>,
) -> Json<SnackResponse> {
    let guests = query.guests.unwrap_or(3).max(1);
    Json(SnackResponse {
        guests,
        plan: state.host.snack_plan(guests),
    })
}

async fn plan_handler(State(state): State<SharedState>) -> Result<Json<PlanResponse>, ApiError> {
    let plan = state.host.generate_plan().await.map_err(host_error)?;
    Ok(Json(PlanResponse { plan }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use partybot_core::error::{ProviderError, StorageError};
    use partybot_core::log::{ConversationLog, ConversationRecord, GuestMessage, RecordRole};
    use partybot_core::message::Message;
    use partybot_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use partybot_core::retry::Backoff;
    use partybot_store::InMemoryLog;
    use tower::ServiceExt;

    /// Lightweight mock provider for gateway tests.
    struct MockProvider {
        result: Result<String, ProviderError>,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.result.clone().map(|text| ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    /// A log that rejects every write.
    struct BrokenLog;

    #[async_trait::async_trait]
    impl ConversationLog for BrokenLog {
        fn name(&self) -> &str {
            "broken"
        }

        async fn append(&self, _record: ConversationRecord) -> Result<bool, StorageError> {
            Err(StorageError::Storage("database is locked".into()))
        }

        async fn query_by_role(&self, _role: RecordRole) -> Result<Vec<GuestMessage>, StorageError> {
            Err(StorageError::QueryFailed("database is locked".into()))
        }

        async fn count(&self) -> Result<usize, StorageError> {
            Ok(0)
        }

        async fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn state_with(
        result: Result<String, ProviderError>,
        log: Arc<dyn ConversationLog>,
    ) -> SharedState {
        let provider: Arc<dyn Provider> = Arc::new(MockProvider { result });
        let orchestrator = Arc::new(
            SessionOrchestrator::builder(provider.clone(), log.clone())
                .storage_backoff(Backoff::none())
                .build(),
        );
        let host = Arc::new(HostDashboard::new(log, provider, "mock-model"));
        GatewayState::new(orchestrator, host)
    }

    fn test_state() -> SharedState {
        state_with(Ok("Nice, see you at 8.".into()), Arc::new(InMemoryLog::new()))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn chat_req(guest: &str, message: &str) -> Request<Body> {
        let body = serde_json::json!({ "guest": guest, "message": message });
        Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());
        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn greeting_endpoint() {
        let app = build_router(test_state());
        let response = app.oneshot(get_req("/v1/greeting")).await.unwrap();
        let json = body_json(response).await;
        assert!(json["greeting"].as_str().unwrap().starts_with("Hey"));
    }

    #[tokio::test]
    async fn chat_returns_reply_and_knowledge() {
        let app = build_router(test_state());
        let response = app
            .oneshot(chat_req("Asha", "coming from office"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["guest"], "Asha");
        assert_eq!(json["reply"], "Nice, see you at 8.");
        assert_eq!(json["phase"], "active");
        assert_eq!(json["learned"], serde_json::json!(["office_status"]));
        assert_eq!(json["knowledge"].as_array().unwrap().len(), 6);
        assert_eq!(json["knowledge"][1]["topic"], "office_status");
        assert_eq!(json["knowledge"][1]["known"], true);
        assert_eq!(json["knowledge"][0]["known"], false);
    }

    #[tokio::test]
    async fn chat_with_empty_message_is_no_content() {
        let app = build_router(test_state());
        let response = app.oneshot(chat_req("Asha", "   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn chat_completion_failure_is_bad_gateway() {
        let state = state_with(
            Err(ProviderError::AuthenticationFailed("bad key".into())),
            Arc::new(InMemoryLog::new()),
        );
        let app = build_router(state);
        let response = app.oneshot(chat_req("Asha", "hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("bad key"));
    }

    #[tokio::test]
    async fn chat_storage_failure_is_service_unavailable() {
        let state = state_with(Ok("unused".into()), Arc::new(BrokenLog));
        let app = build_router(state);
        let response = app.oneshot(chat_req("Asha", "hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn knowledge_and_transcript_after_chat() {
        let state = test_state();
        build_router(state.clone())
            .oneshot(chat_req("Asha", "pizza please"))
            .await
            .unwrap();

        let response = build_router(state.clone())
            .oneshot(get_req("/v1/guests/Asha/knowledge"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["topics"][4]["label"], "Dinner");
        assert_eq!(json["topics"][4]["known"], true);
        assert_eq!(json["complete"], false);

        let response = build_router(state.clone())
            .oneshot(get_req("/v1/guests/Asha/transcript"))
            .await
            .unwrap();
        let json = body_json(response).await;
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");

        let response = build_router(state)
            .oneshot(get_req("/v1/guests"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json[0]["guest"], "Asha");
        assert_eq!(json[0]["known_topics"], 1);
    }

    #[tokio::test]
    async fn unknown_guest_is_not_found() {
        let app = build_router(test_state());
        let response = app
            .oneshot(get_req("/v1/guests/Nobody/knowledge"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn snacks_endpoint_scales_and_floors() {
        let state = test_state();
        let response = build_router(state.clone())
            .oneshot(get_req("/v1/host/snacks?guests=3"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["chips_packets"], 9);
        assert_eq!(json["sweet_snacks"], 3);
        assert_eq!(json["random_munchies"], 6);

        let response = build_router(state)
            .oneshot(get_req("/v1/host/snacks?guests=0"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["chips_packets"], 3);
    }

    #[tokio::test]
    async fn snacks_endpoint_handles_huge_head_counts() {
        let response = build_router(test_state())
            .oneshot(get_req("/v1/host/snacks?guests=2000000000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["chips_packets"], u32::MAX);
        assert_eq!(json["random_munchies"], 4_000_000_000u32);
    }

    #[tokio::test]
    async fn signals_reflect_guest_messages() {
        let state = test_state();
        build_router(state.clone())
            .oneshot(chat_req("Ravi", "bringing nachos"))
            .await
            .unwrap();

        let response = build_router(state)
            .oneshot(get_req("/v1/host/signals"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json[0]["guest"], "Ravi");
        assert_eq!(json[0]["messages"], serde_json::json!(["bringing nachos"]));
    }

    #[tokio::test]
    async fn signals_storage_failure_is_service_unavailable() {
        let state = state_with(Ok("unused".into()), Arc::new(BrokenLog));
        let response = build_router(state)
            .oneshot(get_req("/v1/host/signals"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn plan_endpoint_returns_model_text() {
        let state = state_with(Ok("Order biryani.".into()), Arc::new(InMemoryLog::new()));
        let request = Request::builder()
            .method("POST")
            .uri("/v1/host/plan")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["plan"], "Order biryani.");
    }
}
