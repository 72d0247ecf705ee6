//! Generator provider trait for producing answers

use async_trait::async_trait;
use crate::error::Result;

/// Outcome of one generation call.
///
/// `answer` is `None` when the backing model replied without usable answer
/// text; the orchestrator owns the substitution rule for that case.
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    /// The generated answer text, if the model produced one
    pub answer: Option<String>,
}

/// Trait for LLM-based answer generation
#[async_trait]
pub trait GeneratorProvider: Send + Sync {
    /// Generate an answer for a fully assembled prompt
    async fn generate(&self, prompt: &str) -> Result<GeneratedAnswer>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
