// src/prompt/builder.rs

use crate::persona::NAVIGATOR_PERSONA_PROMPT;

/// Separator placed between retrieved passages in the context slot
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Two-part prompt: fixed persona plus the per-question block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Renders the persona and the history/context/question template.
///
/// Inputs are interpolated verbatim; nothing is escaped.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(NAVIGATOR_PERSONA_PROMPT)
    }
}

impl PromptBuilder {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn render(&self, history: &str, context: &str, question: &str) -> RenderedPrompt {
        RenderedPrompt {
            system: self.persona.clone(),
            user: format!(
                "Předchozí konverzace: {}\n\nKontext: {}\n\nAktuální otázka: {}",
                history, context, question
            ),
        }
    }
}

/// Join retrieved passages, in rank order, into the context slot
pub fn join_passages<S: AsRef<str>>(passages: &[S]) -> String {
    passages
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}
