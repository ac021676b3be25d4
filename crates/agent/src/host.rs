//! Host dashboard: read-only views over the conversation log.

use partybot_config::AppConfig;
use partybot_core::error::{HostError, ProviderError};
use partybot_core::log::{ConversationLog, RecordRole};
use partybot_core::message::Message;
use partybot_core::provider::{Provider, ProviderRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Recommended snack buffer for a head count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnackPlan {
    pub chips_packets: u32,
    pub sweet_snacks: u32,
    pub random_munchies: u32,
}

/// Snack buffer for `guest_count` guests. Counts below one are treated as one,
/// and quantities saturate at `u32::MAX`.
pub fn snack_plan(guest_count: u32) -> SnackPlan {
    let n = guest_count.max(1);
    SnackPlan {
        chips_packets: n.saturating_mul(3),
        sweet_snacks: n,
        random_munchies: n.saturating_mul(2),
    }
}

/// The most recent messages from one guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSignals {
    pub guest: String,
    pub messages: Vec<String>,
}

pub struct HostDashboard {
    log: Arc<dyn ConversationLog>,
    provider: Arc<dyn Provider>,
    model: String,
    recent_limit: usize,
    request_timeout: Duration,
}

impl HostDashboard {
    pub fn new(
        log: Arc<dyn ConversationLog>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            log,
            provider,
            model: model.into(),
            recent_limit: 5,
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        log: Arc<dyn ConversationLog>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self::new(log, provider, &config.default_model)
            .with_recent_limit(config.party.recent_signals)
            .with_timeout(config.request_timeout())
    }

    /// How many messages per guest `recent_signals` keeps.
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Persisted guest messages grouped by guest in order of first
    /// appearance, keeping the last few per guest.
    pub async fn recent_signals(&self) -> Result<Vec<GuestSignals>, HostError> {
        let messages = self.log.query_by_role(RecordRole::User).await?;

        let mut grouped: Vec<GuestSignals> = Vec::new();
        for entry in messages {
            match grouped.iter_mut().find(|g| g.guest == entry.guest) {
                Some(group) => group.messages.push(entry.message),
                None => grouped.push(GuestSignals {
                    guest: entry.guest,
                    messages: vec![entry.message],
                }),
            }
        }

        for group in &mut grouped {
            let excess = group.messages.len().saturating_sub(self.recent_limit);
            group.messages.drain(..excess);
        }

        debug!(guests = grouped.len(), "Collected recent guest signals");
        Ok(grouped)
    }

    pub fn snack_plan(&self, guest_count: u32) -> SnackPlan {
        snack_plan(guest_count)
    }

    /// Ask the model for a party strategy built from every guest message.
    /// Returns the model's text unchanged.
    pub async fn generate_plan(&self) -> Result<String, HostError> {
        let inputs: Vec<String> = self
            .log
            .query_by_role(RecordRole::User)
            .await?
            .into_iter()
            .map(|m| m.message)
            .collect();

        let prompt = planner_prompt(&inputs);
        let request = ProviderRequest::new(&self.model, vec![Message::user(prompt)]);

        info!(inputs = inputs.len(), "Generating party plan");
        let response = tokio::time::timeout(self.request_timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "no plan within {}s",
                    self.request_timeout.as_secs()
                ))
            })??;

        Ok(response.message.content)
    }
}

fn planner_prompt(inputs: &[String]) -> String {
    format!(
        "Generate a concise party strategy.\n\nGuest inputs:\n{}",
        inputs.join("\n")
    )
}
