//! Guest-facing chat surfaces for partybot.
//!
//! Each channel relays `(guest, text)` submissions to the orchestrator and
//! renders replies back. The HTTP surface lives in `partybot-gateway`.
//!
//! Available channels:
//! - **CLI**: Interactive terminal chat (stdin/stdout)

pub mod cli;

pub use cli::CliChannel;
