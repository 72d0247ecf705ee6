//! Document and chunk types with source tracking

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A document loaded from the corpus. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Filename relative to the category directory
    pub filename: String,
    /// Category derived from the containing corpus subdirectory
    pub source_category: String,
    /// Raw text content
    pub text: String,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Load timestamp
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    /// Additional metadata, inherited by every chunk
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a new document. Metadata is seeded with the source category
    /// and filename so chunks carry both without extra bookkeeping.
    pub fn new(
        filename: String,
        source_category: String,
        text: String,
        content_hash: String,
    ) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(
            "source_category".to_string(),
            serde_json::json!(source_category),
        );
        metadata.insert("filename".to_string(), serde_json::json!(filename));

        Self {
            id: Uuid::new_v4(),
            filename,
            source_category,
            text,
            content_hash,
            loaded_at: chrono::Utc::now(),
            metadata,
        }
    }
}

/// Source information for a chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Filename of the parent document
    pub filename: String,
    /// Corpus category of the parent document
    pub source_category: String,
}

impl ChunkSource {
    /// Create source info from a document
    pub fn from_document(doc: &Document) -> Self {
        Self {
            filename: doc.filename.clone(),
            source_category: doc.source_category.clone(),
        }
    }

    /// Format source for display in prompts and logs
    pub fn format_source(&self) -> String {
        format!("{} ({})", self.filename, self.source_category)
    }
}

/// A chunk of text from a document, the atomic unit of retrieval.
/// Created once at index build time; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub text: String,
    /// Source information
    pub source: ChunkSource,
    /// Character position in the original document
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Metadata inherited from the parent document
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document_id: Uuid,
        text: String,
        source: ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            text,
            source,
            char_start,
            char_end,
            chunk_index,
            metadata,
        }
    }
}
