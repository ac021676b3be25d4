//! Per-guest knowledge state.
//!
//! Tracks which [`Topic`]s the assistant has already learned about a guest.
//! Flags only ever turn on: once a topic is known it stays known for the
//! lifetime of the session.

use crate::topic::{Topic, TopicSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which topics are known about one guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeState {
    known: BTreeMap<Topic, bool>,
}

impl KnowledgeState {
    /// A fresh state with every topic unknown.
    pub fn new() -> Self {
        Self {
            known: Topic::ALL.iter().map(|t| (*t, false)).collect(),
        }
    }

    /// The fixed topic enumeration, in rendering order.
    pub fn all_topics() -> &'static [Topic] {
        &Topic::ALL
    }

    /// Mark every detected topic as known. Never clears a flag.
    ///
    /// Returns the topics that were not known before this call.
    pub fn update(&mut self, detected: &TopicSet) -> TopicSet {
        let mut learned = TopicSet::new();
        for topic in detected {
            let flag = self.known.entry(*topic).or_insert(false);
            if !*flag {
                *flag = true;
                learned.insert(*topic);
            }
        }
        learned
    }

    pub fn is_known(&self, topic: Topic) -> bool {
        self.known.get(&topic).copied().unwrap_or(false)
    }

    pub fn known_count(&self) -> usize {
        self.known.values().filter(|v| **v).count()
    }

    /// Whether every topic has been covered.
    pub fn is_complete(&self) -> bool {
        self.known_count() == Topic::ALL.len()
    }

    /// `(topic, known)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Topic, bool)> + '_ {
        Topic::ALL.iter().map(|t| (*t, self.is_known(*t)))
    }
}

impl Default for KnowledgeState {
    fn default() -> Self {
        Self::new()
    }
}
