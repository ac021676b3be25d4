//! Topic detection: maps a guest message to the party topics it mentions.

use partybot_core::topic::{Topic, TopicSet};

/// Infers which topics a piece of text touches.
///
/// Implementations must be pure: the same text always yields the same set.
pub trait TopicDetector: Send + Sync {
    fn detect(&self, text: &str) -> TopicSet;
}

/// Case-insensitive substring matcher over a fixed keyword table.
///
/// Matching is plain containment, so short keywords fire inside longer words
/// ("ps" matches "oops", "by" matches "nearby").
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    table: Vec<(Topic, Vec<&'static str>)>,
}

impl KeywordDetector {
    pub fn new() -> Self {
        let table = Topic::ALL
            .iter()
            .map(|&topic| (topic, default_keywords(topic).to_vec()))
            .collect();
        Self { table }
    }

    /// The keyword table, in canonical topic order.
    pub fn keywords(&self) -> &[(Topic, Vec<&'static str>)] {
        &self.table
    }
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicDetector for KeywordDetector {
    fn detect(&self, text: &str) -> TopicSet {
        if text.trim().is_empty() {
            return TopicSet::new();
        }

        let folded = text.to_lowercase();
        self.table
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| folded.contains(k)))
            .map(|(topic, _)| *topic)
            .collect()
    }
}

fn default_keywords(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::ArrivalTime => &["come", "reach", "arrive", "by", "around"],
        Topic::OfficeStatus => &["office"],
        Topic::HardStop => &["leave", "hard stop", "have to go"],
        Topic::Activities => &["playstation", "ps", "game", "walk", "beach", "run"],
        Topic::Dinner => &["dinner", "eat", "food", "biryani", "pizza"],
        Topic::Snacks => &["snack", "chips", "nachos"],
    }
}
