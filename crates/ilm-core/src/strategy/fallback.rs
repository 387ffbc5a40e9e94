use super::{ResponseCandidate, StrategyName};
use crate::knowledge::KnowledgeSource;

pub const FALLBACK_CONFIDENCE: f32 = 0.6;
const SOURCE_LABEL: &str = "General Help";
/// Topics listed in the help menu.
const MENU_TOPICS: usize = 6;

/// Terminal step: a help menu built once from the knowledge base. Cannot fail.
pub struct FallbackResponse {
    text: String,
}

impl FallbackResponse {
    pub fn new(knowledge: &dyn KnowledgeSource) -> Self {
        let questions: Vec<String> = knowledge
            .all_entries()
            .take(MENU_TOPICS)
            .map(|e| format!("  • {}", e.canonical_question))
            .collect();
        let text = if questions.is_empty() {
            "I'm not sure I understood your question. Could you rephrase it, or ask about \
             a specific topic?"
                .to_string()
        } else {
            format!(
                "I'm not sure I understood your question. Here are some things you can ask me:\n{}\n\
                 Try rephrasing your question, or pick one of these topics.",
                questions.join("\n")
            )
        };
        Self { text }
    }

    pub fn respond(&self) -> ResponseCandidate {
        ResponseCandidate::new(
            self.text.clone(),
            Vec::new(),
            SOURCE_LABEL,
            FALLBACK_CONFIDENCE,
            StrategyName::Fallback,
        )
    }
}
