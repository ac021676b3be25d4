//! SQLite conversation log.
//!
//! A single `conversations` table holds every persisted turn. The
//! `UNIQUE(turn_id, role)` constraint makes `append` idempotent, so a retried
//! insert after an ambiguous failure never duplicates a record.

use async_trait::async_trait;
use partybot_core::error::StorageError;
use partybot_core::log::{ConversationLog, ConversationRecord, GuestMessage, RecordRole};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// A durable conversation log backed by SQLite.
pub struct SqliteLog {
    pool: SqlitePool,
}

impl SqliteLog {
    /// Open a log from a SQLite URL such as `sqlite://party.db`.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Storage(format!("Invalid SQLite path: {e}")))?;
        // Every connection to `:memory:` is a separate database.
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };
        Self::connect(options, max_connections, url).await
    }

    /// Open (or create) a log stored in the file at `path`.
    pub async fn open_file(path: &Path) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new().filename(path);
        Self::connect(options, 4, &path.display().to_string()).await
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let log = Self { pool };
        log.run_migrations().await?;
        Ok(log)
    }

    async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
        location: &str,
    ) -> Result<Self, StorageError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Storage(format!("Failed to open SQLite: {e}")))?;

        let log = Self::from_pool(pool).await?;
        info!("SQLite conversation log initialized at {location}");
        Ok(log)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                turn_id    TEXT NOT NULL,
                guest      TEXT NOT NULL,
                role       TEXT NOT NULL,
                message    TEXT NOT NULL,
                timestamp  TEXT NOT NULL,
                UNIQUE(turn_id, role)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("conversations table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_conversations_role ON conversations(role)")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed(format!("role index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

#[async_trait]
impl ConversationLog for SqliteLog {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, record: ConversationRecord) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO conversations (turn_id, guest, role, message, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(turn_id, role) DO NOTHING
            "#,
        )
        .bind(&record.turn_id)
        .bind(&record.guest)
        .bind(record.role.as_str())
        .bind(&record.message)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Storage(format!("Insert failed: {e}")))?;

        let inserted = result.rows_affected() == 1;
        debug!(
            turn_id = %record.turn_id,
            role = record.role.as_str(),
            inserted,
            "Appended conversation record"
        );
        Ok(inserted)
    }

    async fn query_by_role(&self, role: RecordRole) -> Result<Vec<GuestMessage>, StorageError> {
        let rows = sqlx::query("SELECT guest, message FROM conversations WHERE role = ?1 ORDER BY id")
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Role query failed: {e}")))?;

        rows.iter()
            .map(|row| {
                let guest: String = row
                    .try_get("guest")
                    .map_err(|e| StorageError::QueryFailed(format!("guest column: {e}")))?;
                let message: String = row
                    .try_get("message")
                    .map_err(|e| StorageError::QueryFailed(format!("message column: {e}")))?;
                Ok(GuestMessage { guest, message })
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM conversations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Count failed: {e}")))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| StorageError::QueryFailed(format!("Count column: {e}")))?;
        Ok(count as usize)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM conversations")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Storage(format!("Clear failed: {e}")))?;
        Ok(())
    }
}
