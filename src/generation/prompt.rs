//! Prompt templates for conversational RAG generation

use crate::retrieval::SearchResult;
use crate::types::ConversationTurn;

/// Prompt builder for grounded chat answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from search results
    pub fn build_context(results: &[SearchResult]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                result.chunk.source.format_source(),
                result.chunk.text
            ));
        }

        context
    }

    /// Build the full chat prompt: grounding context, conversation history,
    /// and the current question.
    pub fn build_chat_prompt(
        question: &str,
        history: &[ConversationTurn],
        context: &str,
    ) -> String {
        format!(
            r#"You are an assistant answering questions about a private document collection.

RULES:
1. Base your answer on the CONTEXT below; do not invent facts that are not in it.
2. If the context does not contain the answer, say so plainly instead of guessing.
3. Use the conversation so far to resolve pronouns and follow-up references.

CONTEXT FROM DOCUMENTS:
{context}
{history}QUESTION: {question}

Answer:"#,
            context = context,
            history = Self::format_history(history),
            question = question
        )
    }

    /// Render the conversation history section, empty when there is none
    fn format_history(history: &[ConversationTurn]) -> String {
        if history.is_empty() {
            return String::new();
        }

        let turns: Vec<String> = history
            .iter()
            .map(|turn| format!("User: {}\nAssistant: {}", turn.question, turn.answer))
            .collect();

        format!("CONVERSATION SO FAR:\n{}\n\n", turns.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    use crate::types::{Chunk, ChunkSource};

    fn result(text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk::new(
                Uuid::new_v4(),
                text.to_string(),
                ChunkSource {
                    filename: "sky.md".to_string(),
                    source_category: "facts".to_string(),
                },
                0,
                text.len(),
                0,
                HashMap::new(),
            ),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_context_includes_text_and_source() {
        let context = PromptBuilder::build_context(&[result("The sky is blue.")]);
        assert!(context.contains("The sky is blue."));
        assert!(context.contains("sky.md (facts)"));
        assert!(context.starts_with("[1]"));
    }

    #[test]
    fn test_prompt_without_history_has_no_history_section() {
        let prompt = PromptBuilder::build_chat_prompt("What color is the sky?", &[], "ctx");
        assert!(!prompt.contains("CONVERSATION SO FAR"));
        assert!(prompt.contains("QUESTION: What color is the sky?"));
    }

    #[test]
    fn test_prompt_renders_history_in_order() {
        let history = vec![
            ConversationTurn::new("First question?", "First answer."),
            ConversationTurn::new("Second question?", "Second answer."),
        ];
        let prompt = PromptBuilder::build_chat_prompt("Third?", &history, "ctx");

        assert!(prompt.contains("CONVERSATION SO FAR"));
        let first = prompt.find("First question?").unwrap();
        let second = prompt.find("Second question?").unwrap();
        let current = prompt.find("QUESTION: Third?").unwrap();
        assert!(first < second && second < current);
    }
}
