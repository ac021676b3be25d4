//! LLM Provider implementations for partybot.
//!
//! All providers implement the `partybot_core::Provider` trait.
//! The router builds the configured provider, wrapped in retries.

pub mod openai_compat;
pub mod retry;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use retry::RetryProvider;
pub use router::ProviderRouter;
