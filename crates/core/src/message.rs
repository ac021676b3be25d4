//! Message and Transcript domain types.
//!
//! These are the value objects that flow through a turn:
//! Guest sends a message → Orchestrator records it → Provider generates a reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model (persona + known information)
    System,
    /// The guest
    User,
    /// The party assistant
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }
}

/// The ordered turns of one guest's session.
///
/// Seeded with a single System entry holding the base persona. That entry is
/// never sent to the model: each turn a freshly composed System message
/// replaces it (see [`Transcript::outbound`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create a transcript seeded with the base persona.
    pub fn seeded(persona: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(persona)],
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All User/Assistant turns, in order (System entries excluded).
    pub fn turns(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// Number of User/Assistant turns.
    pub fn turn_count(&self) -> usize {
        self.turns().count()
    }

    /// Build the outbound request: `system` followed by every turn so far.
    pub fn outbound(&self, system: Message) -> Vec<Message> {
        std::iter::once(system)
            .chain(self.turns().cloned())
            .collect()
    }
}
