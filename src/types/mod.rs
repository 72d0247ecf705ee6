//! Core data types

pub mod conversation;
pub mod document;

pub use conversation::ConversationTurn;
pub use document::{Chunk, ChunkSource, Document};
