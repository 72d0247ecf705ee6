//! Application state for the chat server

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::chat::ChatEngine;
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::ingestion::{CorpusLoader, TextChunker};
use crate::providers::{EmbeddingProvider, GeneratorProvider, OllamaProvider};
use crate::retrieval::{Retriever, VectorIndex};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// The answer engine, shared read-only across sessions
    engine: ChatEngine,
    /// What was indexed at startup
    corpus: CorpusSummary,
    /// Ready state
    ready: RwLock<bool>,
}

/// Snapshot of the corpus indexed at startup
#[derive(Debug, Clone, serde::Serialize)]
pub struct CorpusSummary {
    /// Number of documents loaded
    pub documents: usize,
    /// Number of chunks indexed
    pub chunks: usize,
    /// Categories present in the corpus
    pub categories: Vec<String>,
}

impl AppState {
    /// Create new application state.
    ///
    /// This runs the whole startup pipeline: corpus load, chunking, embedder
    /// dimension validation, and index build. Any failure here is fatal; the
    /// process must not serve without a grounded index.
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing chat application state...");

        let documents = CorpusLoader::new(&config.corpus).load()?;
        let categories: Vec<String> = documents
            .iter()
            .map(|d| d.source_category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap);
        let chunks = chunker.split(&documents);
        tracing::info!(
            "Chunked {} documents into {} chunks across {} categories",
            documents.len(),
            chunks.len(),
            categories.len()
        );

        let (embedder, generator) = OllamaProvider::new(&config.llm).split();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
        let generator: Arc<dyn GeneratorProvider> = Arc::new(generator);

        Self::validate_dimensions(embedder.as_ref(), config.llm.embedding_dimensions).await?;

        let document_count = documents.len();
        let index = Arc::new(VectorIndex::build(chunks, embedder.as_ref()).await?);
        tracing::info!(
            "Vector index built ({} entries, {} dimensions)",
            index.len(),
            index.dimensions()
        );

        let corpus = CorpusSummary {
            documents: document_count,
            chunks: index.len(),
            categories,
        };

        let retriever = Retriever::new(Arc::clone(&index), embedder, config.retrieval.top_k);
        let engine = ChatEngine::new(retriever, generator);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                corpus,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Probe the embedder once so a dimension misconfiguration fails here,
    /// at startup, instead of on the first query.
    async fn validate_dimensions(
        embedder: &dyn EmbeddingProvider,
        expected: usize,
    ) -> Result<()> {
        let probe = embedder.embed("dimension probe").await.map_err(|e| {
            Error::config(format!("Embedder unavailable during startup validation: {}", e))
        })?;

        if probe.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: probe.len(),
            });
        }

        Ok(())
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the answer engine
    pub fn engine(&self) -> &ChatEngine {
        &self.inner.engine
    }

    /// Get the corpus summary
    pub fn corpus(&self) -> &CorpusSummary {
        &self.inner.corpus
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
