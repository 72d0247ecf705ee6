//! Capability abstractions for the external embedding and generation models
//!
//! The core never talks to a model library directly; it calls these narrow
//! traits so any backing implementation (local Ollama, a remote service, or a
//! deterministic test stub) can be substituted without touching the pipeline.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::{GeneratedAnswer, GeneratorProvider};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator, OllamaProvider};
