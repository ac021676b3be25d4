//! Conversation log backends for partybot.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryLog;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLog;

use partybot_config::StorageConfig;
use partybot_core::error::StorageError;
use partybot_core::log::ConversationLog;
use std::sync::Arc;
use tracing::info;

/// Open the conversation log selected by `[storage].backend`.
pub async fn open_from_config(
    config: &StorageConfig,
) -> Result<Arc<dyn ConversationLog>, StorageError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory conversation log");
            Ok(Arc::new(InMemoryLog::new()))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.resolved_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Storage(format!(
                        "Cannot create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
            Ok(Arc::new(SqliteLog::open_file(&path).await?))
        }
        other => Err(StorageError::Storage(format!(
            "Unknown storage backend '{other}'"
        ))),
    }
}
