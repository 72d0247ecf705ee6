//! In-memory vector index with exact cosine search
//!
//! The index is built once at startup from all chunk embeddings and is
//! read-only afterwards, so it can be shared across sessions without locks.

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (higher is better)
    pub similarity: f32,
}

/// One indexed chunk with its embedding. Entries keep insertion order, which
/// doubles as the tie-break order for equal similarities.
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
    norm: f32,
}

/// Read-only vector index over chunk embeddings
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build the index by embedding every chunk, one call per chunk.
    ///
    /// A chunk whose embedding call fails is skipped with a warning; a vector
    /// of the wrong dimension is a fatal configuration error. An empty input
    /// or a build where nothing could be indexed refuses to produce an index
    /// at all, since the system would have nothing to ground answers on.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let dimensions = embedder.dimensions();
        let total = chunks.len();
        let mut entries = Vec::with_capacity(total);
        let mut skipped = 0usize;

        for chunk in chunks {
            let vector = match embedder.embed(&chunk.text).await {
                Ok(vector) => vector,
                Err(e) => {
                    tracing::warn!(chunk_id = %chunk.id, "Skipping chunk, embedding failed: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            if vector.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }

            let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            entries.push(IndexEntry { chunk, vector, norm });
        }

        if entries.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        if skipped > 0 {
            tracing::warn!("Indexed {} of {} chunks ({} failed to embed)", entries.len(), total, skipped);
        }

        Ok(Self { entries, dimensions })
    }

    /// Return the `min(k, len)` most similar chunks, ranked by descending
    /// cosine similarity. Ties keep insertion order (the sort is stable).
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query_vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query_vector.len(),
            });
        }

        let query_norm = query_vector.iter().map(|x| x * x).sum::<f32>().sqrt();

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(&entry.vector, entry.norm, query_vector, query_norm),
            })
            .collect();

        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(k);

        Ok(results)
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensions the index was built with
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn cosine_similarity(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use uuid::Uuid;

    use crate::types::ChunkSource;

    /// Deterministic embedder: a fixed vector per known text, zeroes
    /// elsewhere. Fails on texts containing "poison".
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        dimensions: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            if text.contains("poison") {
                return Err(Error::embedding("stub failure"));
            }
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.1; self.dimensions]))
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk::new(
            Uuid::new_v4(),
            text.to_string(),
            ChunkSource {
                filename: "test.md".to_string(),
                source_category: "facts".to_string(),
            },
            0,
            text.len(),
            0,
            HashMap::new(),
        )
    }

    fn embedder(pairs: &[(&str, Vec<f32>)]) -> StubEmbedder {
        let dimensions = pairs.first().map(|(_, v)| v.len()).unwrap_or(3);
        StubEmbedder {
            vectors: pairs
                .iter()
                .map(|(t, v)| (t.to_string(), v.clone()))
                .collect(),
            dimensions,
        }
    }

    #[tokio::test]
    async fn test_self_retrieval_returns_chunk_as_top_result() {
        let stub = embedder(&[
            ("the sky", vec![1.0, 0.0, 0.0]),
            ("the sea", vec![0.0, 1.0, 0.0]),
            ("the land", vec![0.0, 0.0, 1.0]),
        ]);
        let chunks = vec![chunk("the sky"), chunk("the sea"), chunk("the land")];
        let index = VectorIndex::build(chunks, &stub).await.unwrap();

        let results = index.search(&[0.0, 1.0, 0.0], 3).unwrap();
        assert_eq!(results[0].chunk.text, "the sea");
        assert!(results[0].similarity > results[1].similarity);
    }

    #[tokio::test]
    async fn test_search_returns_at_most_k_results() {
        let stub = embedder(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
        let index = VectorIndex::build(vec![chunk("a"), chunk("b")], &stub)
            .await
            .unwrap();

        assert_eq!(index.search(&[1.0, 0.0], 1).unwrap().len(), 1);
        // Fewer chunks than k: exactly min(k, len)
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let stub = embedder(&[
            ("first", vec![1.0, 0.0]),
            ("second", vec![1.0, 0.0]),
            ("third", vec![1.0, 0.0]),
        ]);
        let index = VectorIndex::build(
            vec![chunk("first"), chunk("second"), chunk("third")],
            &stub,
        )
        .await
        .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_empty_corpus_refuses_to_build() {
        let stub = embedder(&[]);
        let result = VectorIndex::build(Vec::new(), &stub).await;
        assert!(matches!(result, Err(Error::EmptyCorpus)));
    }

    #[tokio::test]
    async fn test_all_embeddings_failing_refuses_to_build() {
        let stub = embedder(&[]);
        let result = VectorIndex::build(vec![chunk("poison one"), chunk("poison two")], &stub).await;
        assert!(matches!(result, Err(Error::EmptyCorpus)));
    }

    #[tokio::test]
    async fn test_partial_embedding_failure_skips_chunk() {
        let stub = embedder(&[("good", vec![1.0, 0.0])]);
        let index = VectorIndex::build(vec![chunk("good"), chunk("poison")], &stub)
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_rejected() {
        let stub = embedder(&[("a", vec![1.0, 0.0, 0.0])]);
        let index = VectorIndex::build(vec![chunk("a")], &stub).await.unwrap();
        let result = index.search(&[1.0, 0.0], 1);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }
}
