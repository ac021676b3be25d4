//! Shared mocks for orchestrator and dashboard tests.

use async_trait::async_trait;
use partybot_core::error::{ProviderError, StorageError};
use partybot_core::log::{ConversationLog, ConversationRecord, GuestMessage, RecordRole};
use partybot_core::message::Message;
use partybot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use partybot_store::InMemoryLog;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A provider that replays scripted results and records every request.
///
/// Once the script runs out it keeps answering with `"Sounds good!"`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("Sounds good!")))
    }
}

/// A provider that never answers (for timeout testing).
pub struct HangingProvider;

#[async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!()
    }
}

pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A conversation log whose appends for `role` fail the first `failures`
/// times, then pass through to an in-memory log.
pub struct FlakyLog {
    inner: InMemoryLog,
    role: RecordRole,
    failures: Mutex<usize>,
}

impl FlakyLog {
    pub fn new(role: RecordRole, failures: usize) -> Self {
        Self {
            inner: InMemoryLog::new(),
            role,
            failures: Mutex::new(failures),
        }
    }

    /// Fails every append for `role`.
    pub fn broken(role: RecordRole) -> Self {
        Self::new(role, usize::MAX)
    }

    pub async fn records(&self) -> Vec<ConversationRecord> {
        self.inner.records().await
    }
}

#[async_trait]
impl ConversationLog for FlakyLog {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn append(&self, record: ConversationRecord) -> Result<bool, StorageError> {
        if record.role == self.role {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(StorageError::Storage("disk unavailable".into()));
            }
        }
        self.inner.append(record).await
    }

    async fn query_by_role(&self, role: RecordRole) -> Result<Vec<GuestMessage>, StorageError> {
        self.inner.query_by_role(role).await
    }

    async fn count(&self) -> Result<usize, StorageError> {
        self.inner.count().await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }
}
