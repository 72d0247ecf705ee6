//! Orchestration of retrieval, memory, and generation

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::GeneratorProvider;
use crate::retrieval::Retriever;
use crate::types::ConversationTurn;

use super::memory::ConversationMemory;

/// Reply for an empty or whitespace-only message
pub const EMPTY_QUERY_REPLY: &str = "Please provide a valid question.";
/// Reply substituted when the generator returns no usable answer text
pub const NO_ANSWER_REPLY: &str = "Sorry, I could not generate a response.";
/// Reply when retrieval fails
pub const RETRIEVAL_FAILED_REPLY: &str =
    "Sorry, I ran into a problem searching the documents. Please try again.";
/// Reply when generation fails
pub const GENERATION_FAILED_REPLY: &str =
    "Sorry, I ran into a problem generating an answer. Please try again.";

/// Composes retrieval, conversation memory, and generation into a single
/// answer-producing operation.
///
/// The engine itself is stateless; all mutable state lives in the caller's
/// `ConversationMemory` and the read-only index behind the retriever, so one
/// engine instance serves every session concurrently.
pub struct ChatEngine {
    retriever: Retriever,
    generator: Arc<dyn GeneratorProvider>,
}

impl ChatEngine {
    /// Create a new engine
    pub fn new(retriever: Retriever, generator: Arc<dyn GeneratorProvider>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer one user query within a session.
    ///
    /// This is the sole operation the transport layer invokes. It never
    /// returns an error: per-query failures are logged with their cause and
    /// converted into a safe user-visible reply. A turn is recorded in memory
    /// only when a full answer was produced.
    pub async fn answer(&self, memory: &mut ConversationMemory, query: &str) -> String {
        if query.trim().is_empty() {
            return EMPTY_QUERY_REPLY.to_string();
        }

        match self.answer_inner(memory, query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Failed to answer query: {}", e);
                match e {
                    Error::Llm(_) => GENERATION_FAILED_REPLY.to_string(),
                    _ => RETRIEVAL_FAILED_REPLY.to_string(),
                }
            }
        }
    }

    async fn answer_inner(
        &self,
        memory: &mut ConversationMemory,
        query: &str,
    ) -> Result<String> {
        let retrieved = self.retriever.retrieve(query).await?;
        let context = PromptBuilder::build_context(&retrieved);
        let prompt = PromptBuilder::build_chat_prompt(query, memory.history(), &context);

        let generated = self.generator.generate(&prompt).await?;
        let answer = generated
            .answer
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| NO_ANSWER_REPLY.to_string());

        memory.append(ConversationTurn::new(query, &answer));
        Ok(answer)
    }

    /// The retriever backing this engine
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }
}
