//! Vector index and query-side retrieval

pub mod index;
pub mod search;

pub use index::{SearchResult, VectorIndex};
pub use search::Retriever;
