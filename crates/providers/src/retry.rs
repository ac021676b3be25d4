//! Provider retry: re-issues a failed completion with bounded backoff.
//!
//! Only errors that report [`ProviderError::is_retryable`] are retried.
//! Authentication and client errors fail on the first attempt.

use async_trait::async_trait;
use partybot_core::error::ProviderError;
use partybot_core::provider::*;
use partybot_core::Backoff;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A provider that wraps another and retries transient failures.
pub struct RetryProvider {
    inner: Arc<dyn partybot_core::Provider>,
    backoff: Backoff,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn partybot_core::Provider>, backoff: Backoff) -> Self {
        Self { inner, backoff }
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Wait before the next attempt. A provider-supplied retry-after wins over
    /// the computed delay but never exceeds `max_delay`.
    fn delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        match error {
            ProviderError::RateLimited { retry_after_secs } => {
                Duration::from_secs(*retry_after_secs).min(self.backoff.max_delay)
            }
            _ => self.backoff.delay_after(attempt),
        }
    }
}

#[async_trait]
impl partybot_core::Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 1;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && self.backoff.should_retry(attempt) => {
                    let delay = self.delay_for(attempt, &e);
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        max_attempts = self.backoff.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Completion failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        self.inner.health_check().await
    }
}
