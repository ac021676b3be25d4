//! Per-guest session state.

use partybot_core::knowledge::KnowledgeState;
use partybot_core::message::Transcript;
use serde::{Deserialize, Serialize};

/// Where a guest is in their conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session exists for the guest yet.
    Idle,
    /// Session created; the surface shows the greeting.
    AwaitingFirstMessage,
    /// At least one turn completed. There is no terminal phase.
    Active,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::AwaitingFirstMessage => "awaiting_first_message",
            SessionPhase::Active => "active",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the assistant holds about one guest.
///
/// Owned by the orchestrator; nothing here is shared between guests.
#[derive(Debug, Clone)]
pub struct GuestSession {
    pub guest: String,
    pub knowledge: KnowledgeState,
    pub transcript: Transcript,
    pub phase: SessionPhase,
}

impl GuestSession {
    pub fn new(guest: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            guest: guest.into(),
            knowledge: KnowledgeState::new(),
            transcript: Transcript::seeded(persona),
            phase: SessionPhase::AwaitingFirstMessage,
        }
    }

    /// Record a completed turn.
    pub fn mark_active(&mut self) {
        self.phase = SessionPhase::Active;
    }
}
