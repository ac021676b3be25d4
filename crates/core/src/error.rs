//! Error types for the partybot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type; [`Error`] aggregates them.

use thiserror::Error;

/// The top-level error type for all partybot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Conversation turn errors ---
    #[error("Turn error: {0}")]
    Turn(#[from] TurnError),

    // --- Host dashboard errors ---
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::NotConfigured(_) => false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },
}

/// Failure of a single guest turn.
///
/// None of these are fatal: they affect one turn of one guest.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Missing guest identity or empty text. Surfaces ignore this silently.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The completion capability failed. The user's message stays persisted.
    #[error("Completion failed: {message}")]
    CompletionFailed {
        message: String,
        #[source]
        source: ProviderError,
    },

    /// The conversation log could not be written.
    ///
    /// `reply` is set when the failure happened while persisting the
    /// assistant's reply, so the surface can still show it.
    #[error("Storage unavailable: {source}")]
    StorageUnavailable {
        #[source]
        source: StorageError,
        reply: Option<String>,
    },
}

impl TurnError {
    pub fn completion(source: ProviderError) -> Self {
        Self::CompletionFailed {
            message: source.to_string(),
            source,
        }
    }
}

/// Failure of a host dashboard operation.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("Plan generation failed: {0}")]
    CompletionFailed(#[from] ProviderError),
}
