//! Conversation log trait: durable, append-only record of guest turns.
//!
//! Only User and Assistant turns are persisted; the composed System prompt
//! never reaches the log. The host dashboard reads the log back by role.

use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a persisted record. System messages are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordRole {
    User,
    Assistant,
}

impl RecordRole {
    /// The value stored in the backing store.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordRole::User => "user",
            RecordRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(RecordRole::User),
            "assistant" => Some(RecordRole::Assistant),
            _ => None,
        }
    }
}

/// A single persisted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Identifies the turn that produced this record. `(turn_id, role)` is
    /// unique, so re-appending the same record is a no-op.
    pub turn_id: String,

    /// Guest identity (free-text name)
    pub guest: String,

    pub role: RecordRole,

    pub message: String,

    pub timestamp: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(
        turn_id: impl Into<String>,
        guest: impl Into<String>,
        role: RecordRole,
        message: impl Into<String>,
    ) -> Self {
        Self {
            turn_id: turn_id.into(),
            guest: guest.into(),
            role,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A `(guest, message)` pair returned by role queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestMessage {
    pub guest: String,
    pub message: String,
}

/// The core ConversationLog trait.
///
/// Implementations: SQLite, in-memory (for testing and ephemeral runs).
/// Each `append` must be atomic as a unit; ordering is insertion order.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Append a record. Returns `false` if a record with the same
    /// `(turn_id, role)` already exists and nothing was written.
    async fn append(&self, record: ConversationRecord) -> Result<bool, StorageError>;

    /// All records with the given role, in insertion order.
    async fn query_by_role(&self, role: RecordRole) -> Result<Vec<GuestMessage>, StorageError>;

    /// Total record count.
    async fn count(&self) -> Result<usize, StorageError>;

    /// Delete every record.
    async fn clear(&self) -> Result<(), StorageError>;
}
