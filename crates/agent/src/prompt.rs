//! System prompt composition.
//!
//! The composed prompt is rebuilt from scratch every turn and replaces the
//! previous one; knowledge snapshots never pile up in the transcript.

use partybot_core::knowledge::KnowledgeState;

/// The default party persona for the given venue.
pub fn base_persona(venue: &str) -> String {
    format!(
        r#"
You are a cool, socially smooth, lightly witty AI party assistant.

PERSONALITY:
- Relaxed, effortless tone
- Dry humor, subtle confidence
- Friendly but never overeager
- Never creepy or intense

INTERACTION PRINCIPLE:
The guest should feel like they are casually chatting with a clever human.

CONVERSATION STYLE:
- Short natural messages
- No survey feel
- No repeated questions
- No stacked interrogation

OBJECTIVE:
Casually understand preferences through conversation.

Topics to gradually understand:
- Arrival timing
- Coming from office or not
- Hard stop constraints
- Activities
- Dinner preference
- Snack preferences

PARTY CONTEXT:
Night gathering in {venue}.

RULES:
- Never ask about dancing
- Never sound like a questionnaire
- Never repeat questions
"#
    )
}

/// Builds the per-turn system prompt from a persona and a knowledge snapshot.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    persona: String,
}

impl PromptComposer {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn compose(&self, state: &KnowledgeState) -> String {
        compose(&self.persona, state)
    }
}

/// Persona followed by one `<label> known: <bool>` line per topic, in fixed
/// order, and the no-re-ask rule.
pub fn compose(persona: &str, state: &KnowledgeState) -> String {
    let known = state
        .iter()
        .map(|(topic, known)| format!("{} known: {known}", topic.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{persona}\n\nKNOWN INFORMATION (DO NOT RE-ASK):\n\n{known}\n\nRULE:\nNever ask for information already marked as known.\n"
    )
}
