//! Query-side retrieval over the vector index

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::index::{SearchResult, VectorIndex};

/// Retrieves the top-K chunks for a query.
///
/// Only the current query text is embedded; conversation history stays out of
/// the similarity search even though generation later sees it.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over a built index
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    /// Retrieve the most similar chunks for a query.
    ///
    /// An empty or whitespace-only query is rejected before any embedding
    /// call is made.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&query_embedding, self.top_k)?;

        tracing::debug!(
            "Retrieved {} chunks for query (top score: {:.3})",
            results.len(),
            results.first().map(|r| r.similarity).unwrap_or(0.0)
        );

        Ok(results)
    }

    /// The index this retriever searches
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}
