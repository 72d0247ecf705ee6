//! Corpus loading and text chunking

pub mod chunker;
pub mod loader;

pub use chunker::TextChunker;
pub use loader::CorpusLoader;
