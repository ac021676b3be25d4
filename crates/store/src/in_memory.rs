//! In-memory conversation log: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use partybot_core::error::StorageError;
use partybot_core::log::{ConversationLog, ConversationRecord, GuestMessage, RecordRole};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A conversation log that keeps records in a Vec.
/// Nothing survives a restart.
pub struct InMemoryLog {
    records: Arc<RwLock<Vec<ConversationRecord>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of every record, in insertion order.
    pub async fn records(&self) -> Vec<ConversationRecord> {
        self.records.read().await.clone()
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationLog for InMemoryLog {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, record: ConversationRecord) -> Result<bool, StorageError> {
        let mut records = self.records.write().await;
        let duplicate = records
            .iter()
            .any(|r| r.turn_id == record.turn_id && r.role == record.role);
        if duplicate {
            return Ok(false);
        }
        records.push(record);
        Ok(true)
    }

    async fn query_by_role(&self, role: RecordRole) -> Result<Vec<GuestMessage>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.role == role)
            .map(|r| GuestMessage {
                guest: r.guest.clone(),
                message: r.message.clone(),
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.records.read().await.len())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.records.write().await.clear();
        Ok(())
    }
}
