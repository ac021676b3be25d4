//! Topics the assistant tries to learn about each guest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A logistics topic the assistant casually extracts from a guest.
///
/// The declaration order is the canonical order: `Ord` follows it, and so do
/// [`Topic::ALL`] and every rendered prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// When the guest will show up
    ArrivalTime,
    /// Whether the guest is coming straight from the office
    OfficeStatus,
    /// Whether the guest has to leave by a fixed time
    HardStop,
    /// What the guest wants to do (games, a walk on the beach, ...)
    Activities,
    /// Dinner preference
    Dinner,
    /// Snack preference
    Snacks,
}

/// A set of topics, iterated in canonical order.
pub type TopicSet = BTreeSet<Topic>;

impl Topic {
    /// Every topic, in canonical order.
    pub const ALL: [Topic; 6] = [
        Topic::ArrivalTime,
        Topic::OfficeStatus,
        Topic::HardStop,
        Topic::Activities,
        Topic::Dinner,
        Topic::Snacks,
    ];

    /// Human-readable label used in prompts and dashboards.
    pub fn label(self) -> &'static str {
        match self {
            Topic::ArrivalTime => "Arrival time",
            Topic::OfficeStatus => "Coming from office",
            Topic::HardStop => "Hard stop",
            Topic::Activities => "Activities",
            Topic::Dinner => "Dinner",
            Topic::Snacks => "Snacks",
        }
    }

    /// Stable machine name (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::ArrivalTime => "arrival_time",
            Topic::OfficeStatus => "office_status",
            Topic::HardStop => "hard_stop",
            Topic::Activities => "activities",
            Topic::Dinner => "dinner",
            Topic::Snacks => "snacks",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
