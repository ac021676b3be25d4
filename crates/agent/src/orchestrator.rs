//! The session orchestrator: runs one guest turn end to end.

use crate::detector::{KeywordDetector, TopicDetector};
use crate::prompt::{PromptComposer, base_persona};
use crate::session::{GuestSession, SessionPhase};
use partybot_config::AppConfig;
use partybot_core::error::{ProviderError, StorageError, TurnError};
use partybot_core::knowledge::KnowledgeState;
use partybot_core::log::{ConversationLog, ConversationRecord, RecordRole};
use partybot_core::message::Message;
use partybot_core::provider::{Provider, ProviderRequest};
use partybot_core::retry::Backoff;
use partybot_core::topic::Topic;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// The outcome of a successful guest turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub guest: String,
    pub turn_id: String,
    pub reply: String,
    /// Knowledge after this turn
    pub knowledge: KnowledgeState,
    /// Topics that became known during this turn
    pub learned: Vec<Topic>,
    pub phase: SessionPhase,
}

/// Owns every guest session and drives turns through detection, prompt
/// composition, completion and persistence.
///
/// Turns from one guest are serialized by that guest's session lock.
/// Different guests run concurrently.
pub struct SessionOrchestrator {
    provider: Arc<dyn Provider>,
    log: Arc<dyn ConversationLog>,
    detector: Arc<dyn TopicDetector>,
    composer: PromptComposer,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    request_timeout: Duration,
    storage_backoff: Backoff,
    greeting: String,
    sessions: RwLock<HashMap<String, Arc<Mutex<GuestSession>>>>,
}

impl SessionOrchestrator {
    pub fn builder(
        provider: Arc<dyn Provider>,
        log: Arc<dyn ConversationLog>,
    ) -> SessionOrchestratorBuilder {
        SessionOrchestratorBuilder::new(provider, log)
    }

    /// Orchestrator configured from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        log: Arc<dyn ConversationLog>,
    ) -> Self {
        let persona = config
            .party
            .persona_override
            .clone()
            .unwrap_or_else(|| base_persona(&config.party.venue));

        Self::builder(provider, log)
            .persona(persona)
            .model(&config.default_model)
            .temperature(config.default_temperature)
            .max_tokens(config.default_max_tokens)
            .request_timeout(config.request_timeout())
            .storage_backoff(config.retry.backoff())
            .greeting(&config.party.greeting)
            .build()
    }

    /// The static opening line shown before a guest's first message.
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Open (or reuse) a session for `guest` without sending a turn.
    pub async fn start_session(&self, guest: &str) -> Result<SessionPhase, TurnError> {
        let guest = validate_guest(guest)?;
        let session = self.session(guest).await;
        let phase = session.lock().await.phase;
        Ok(phase)
    }

    /// Process one guest turn.
    ///
    /// Invalid input is rejected before anything is touched. Once the user
    /// turn is persisted it stays persisted, whatever happens to the
    /// completion call.
    pub async fn handle_turn(&self, guest: &str, text: &str) -> Result<TurnReply, TurnError> {
        let guest = validate_guest(guest)?;
        if text.trim().is_empty() {
            return Err(TurnError::InvalidInput("empty message".into()));
        }

        let session = self.session(guest).await;
        let mut session = session.lock().await;

        let detected = self.detector.detect(text);
        let learned = session.knowledge.update(&detected);
        if !learned.is_empty() {
            info!(guest = %guest, learned = ?learned, "Learned guest topics");
        }

        let turn_id = uuid::Uuid::new_v4().to_string();
        session.transcript.push(Message::user(text));
        self.persist(ConversationRecord::new(&turn_id, guest, RecordRole::User, text))
            .await
            .map_err(|source| TurnError::StorageUnavailable {
                source,
                reply: None,
            })?;

        let system = Message::system(self.composer.compose(&session.knowledge));
        let request = ProviderRequest::new(&self.model, session.transcript.outbound(system))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        debug!(
            guest = %guest,
            turn_id = %turn_id,
            messages = request.messages.len(),
            "Requesting completion"
        );

        let response =
            match tokio::time::timeout(self.request_timeout, self.provider.complete(request)).await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(guest = %guest, turn_id = %turn_id, error = %e, "Completion failed");
                    return Err(TurnError::completion(e));
                }
                Err(_) => {
                    warn!(
                        guest = %guest,
                        turn_id = %turn_id,
                        timeout_secs = self.request_timeout.as_secs(),
                        "Completion timed out"
                    );
                    return Err(TurnError::completion(ProviderError::Timeout(format!(
                        "no reply within {}s",
                        self.request_timeout.as_secs()
                    ))));
                }
            };

        let reply = response.message.content;
        session.transcript.push(Message::assistant(&reply));
        session.mark_active();

        let outcome = TurnReply {
            guest: guest.to_string(),
            turn_id: turn_id.clone(),
            reply: reply.clone(),
            knowledge: session.knowledge.clone(),
            learned: learned.into_iter().collect(),
            phase: session.phase,
        };

        self.persist(ConversationRecord::new(
            &turn_id,
            guest,
            RecordRole::Assistant,
            &reply,
        ))
        .await
        .map_err(|source| TurnError::StorageUnavailable {
            source,
            reply: Some(reply),
        })?;

        info!(
            guest = %guest,
            turn_id = %turn_id,
            known = outcome.knowledge.known_count(),
            "Turn complete"
        );
        Ok(outcome)
    }

    /// The guest's phase. `Idle` when no session exists.
    pub async fn phase(&self, guest: &str) -> SessionPhase {
        match self.existing(guest).await {
            Some(session) => session.lock().await.phase,
            None => SessionPhase::Idle,
        }
    }

    pub async fn knowledge(&self, guest: &str) -> Option<KnowledgeState> {
        let session = self.existing(guest).await?;
        let knowledge = session.lock().await.knowledge.clone();
        Some(knowledge)
    }

    /// The guest's User/Assistant turns, in order.
    pub async fn transcript(&self, guest: &str) -> Option<Vec<Message>> {
        let session = self.existing(guest).await?;
        let turns = session.lock().await.transcript.turns().cloned().collect();
        Some(turns)
    }

    /// Guests with an open session, sorted by name.
    pub async fn guests(&self) -> Vec<String> {
        let mut guests: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        guests.sort();
        guests
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn existing(&self, guest: &str) -> Option<Arc<Mutex<GuestSession>>> {
        self.sessions.read().await.get(guest.trim()).cloned()
    }

    async fn session(&self, guest: &str) -> Arc<Mutex<GuestSession>> {
        if let Some(session) = self.sessions.read().await.get(guest) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(guest.to_string())
            .or_insert_with(|| {
                info!(guest = %guest, "Guest session started");
                Arc::new(Mutex::new(GuestSession::new(guest, self.composer.persona())))
            })
            .clone()
    }

    /// Append with bounded retry. Duplicate appends are harmless.
    async fn persist(&self, record: ConversationRecord) -> Result<(), StorageError> {
        let mut attempt = 1;
        loop {
            match self.log.append(record.clone()).await {
                Ok(inserted) => {
                    if !inserted {
                        debug!(turn_id = %record.turn_id, "Record already persisted");
                    }
                    return Ok(());
                }
                Err(e) if self.storage_backoff.should_retry(attempt) => {
                    let delay = self.storage_backoff.delay_after(attempt);
                    warn!(
                        turn_id = %record.turn_id,
                        role = record.role.as_str(),
                        attempt,
                        error = %e,
                        "Conversation log append failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        turn_id = %record.turn_id,
                        role = record.role.as_str(),
                        error = %e,
                        "Conversation log append failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

fn validate_guest(guest: &str) -> Result<&str, TurnError> {
    let guest = guest.trim();
    if guest.is_empty() {
        return Err(TurnError::InvalidInput("missing guest identity".into()));
    }
    Ok(guest)
}

/// Builder for [`SessionOrchestrator`].
pub struct SessionOrchestratorBuilder {
    provider: Arc<dyn Provider>,
    log: Arc<dyn ConversationLog>,
    detector: Arc<dyn TopicDetector>,
    persona: Option<String>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    request_timeout: Duration,
    storage_backoff: Backoff,
    greeting: String,
}

impl SessionOrchestratorBuilder {
    fn new(provider: Arc<dyn Provider>, log: Arc<dyn ConversationLog>) -> Self {
        let defaults = AppConfig::default();
        Self {
            provider,
            log,
            detector: Arc::new(KeywordDetector::new()),
            persona: None,
            model: defaults.default_model,
            temperature: None,
            max_tokens: None,
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
            storage_backoff: Backoff::default(),
            greeting: defaults.party.greeting,
        }
    }

    pub fn detector(mut self, detector: Arc<dyn TopicDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn storage_backoff(mut self, backoff: Backoff) -> Self {
        self.storage_backoff = backoff;
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn build(self) -> SessionOrchestrator {
        let persona = self
            .persona
            .unwrap_or_else(|| base_persona(&AppConfig::default().party.venue));

        SessionOrchestrator {
            provider: self.provider,
            log: self.log,
            detector: self.detector,
            composer: PromptComposer::new(persona),
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout: self.request_timeout,
            storage_backoff: self.storage_backoff,
            greeting: self.greeting,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}
