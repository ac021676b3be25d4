//! # partybot core
//!
//! Domain types, traits, and error definitions for the partybot party
//! assistant. This crate has **no framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Layout
//!
//! Each external collaborator is a trait here, with implementations in their
//! own crates:
//! - [`Provider`] (completion capability) lives in `partybot-providers`
//! - [`ConversationLog`] (durable storage) lives in `partybot-store`
//! - [`Channel`] (presentation surface) lives in `partybot-channels`
//!
//! The guest-knowledge model ([`Topic`], [`KnowledgeState`]) is plain data
//! and is shared by the agent, the gateway and the CLI.

pub mod channel;
pub mod error;
pub mod knowledge;
pub mod log;
pub mod message;
pub mod provider;
pub mod retry;
pub mod topic;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelId, ChannelMessage};
pub use error::{Error, Result};
pub use knowledge::KnowledgeState;
pub use log::{ConversationLog, ConversationRecord, GuestMessage, RecordRole};
pub use message::{Message, Role, Transcript};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retry::Backoff;
pub use topic::{Topic, TopicSet};
