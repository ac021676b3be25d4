//! Guest conversation flow for partybot.
//!
//! Each guest turn runs through the same pipeline:
//!
//! 1. **Detect** which party topics the message touches
//! 2. **Update** the guest's knowledge state (monotonic, never cleared)
//! 3. **Persist** the user turn to the conversation log
//! 4. **Compose** a fresh system prompt from the persona and knowledge state
//! 5. **Complete** via the configured provider and persist the reply
//!
//! The [`HostDashboard`] reads the same conversation log back for the host.

pub mod detector;
pub mod host;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use detector::{KeywordDetector, TopicDetector};
pub use host::{GuestSignals, HostDashboard, SnackPlan, snack_plan};
pub use orchestrator::{SessionOrchestrator, SessionOrchestratorBuilder, TurnReply};
pub use prompt::{PromptComposer, base_persona};
pub use session::{GuestSession, SessionPhase};

#[cfg(test)]
pub(crate) mod test_helpers;
