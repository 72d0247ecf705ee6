//! Text chunking with bounded overlapping windows

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Chunk, ChunkSource, Document};

/// Text chunker with configurable size and overlap.
///
/// Documents are split into consecutive windows of at most `chunk_size`
/// characters; each window starts `overlap` characters before the previous
/// window's end. Window ends prefer a whitespace break near the hard cut so
/// words are not split mid-token; if none is found within the tolerance the
/// window is cut hard. Splitting is deterministic for identical input.
///
/// Positions are measured in grapheme clusters so multi-byte text never gets
/// cut inside a character.
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. Callers validate `overlap < chunk_size` and
    /// `chunk_size > 0` via `RagConfig::validate`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    /// Chunk a sequence of documents, preserving document order
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect()
    }

    /// Chunk a single document. A document shorter than `chunk_size` yields
    /// exactly one chunk holding the whole text.
    pub fn split_document(&self, doc: &Document) -> Vec<Chunk> {
        // Grapheme boundaries as byte offsets, with the text end appended so
        // boundary i..i+1 brackets grapheme i.
        let mut bounds: Vec<usize> = doc.text.grapheme_indices(true).map(|(i, _)| i).collect();
        bounds.push(doc.text.len());
        let total = bounds.len() - 1;

        if total == 0 {
            return Vec::new();
        }

        let source = ChunkSource::from_document(doc);
        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut chunk_index = 0u32;

        loop {
            let hard_end = start + self.chunk_size;
            let end = if hard_end >= total {
                total
            } else {
                self.snap_end(&doc.text, &bounds, hard_end)
            };

            chunks.push(Chunk::new(
                doc.id,
                doc.text[bounds[start]..bounds[end]].to_string(),
                source.clone(),
                start,
                end,
                chunk_index,
                doc.metadata.clone(),
            ));
            chunk_index += 1;

            if end >= total {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }

    /// Move the window end back to just after the last whitespace grapheme
    /// within the tolerance, or keep the hard cut when none exists. The
    /// tolerance stays below `chunk_size - overlap` so every window advances
    /// past the previous one's start.
    fn snap_end(&self, text: &str, bounds: &[usize], hard_end: usize) -> usize {
        let tolerance = (self.chunk_size - self.overlap) / 2;
        let floor = hard_end.saturating_sub(tolerance);

        for pos in (floor..hard_end).rev() {
            let grapheme = &text[bounds[pos]..bounds[pos + 1]];
            if grapheme.chars().all(char::is_whitespace) {
                return pos + 1;
            }
        }

        hard_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new(
            "test.md".to_string(),
            "facts".to_string(),
            text.to_string(),
            "hash".to_string(),
        )
    }

    #[test]
    fn test_short_document_yields_single_whole_chunk() {
        let document = doc("The sky is blue. Grass is green.");
        let chunks = TextChunker::new(1000, 200).split_document(&document);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "The sky is blue. Grass is green.");
        assert_eq!(chunks[0].char_start, 0);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let document = doc(&"lorem ipsum dolor sit amet ".repeat(40));
        let chunker = TextChunker::new(100, 20);
        let first: Vec<String> = chunker
            .split_document(&document)
            .into_iter()
            .map(|c| c.text)
            .collect();
        let second: Vec<String> = chunker
            .split_document(&document)
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunk_size_bound_holds() {
        let document = doc(&"word ".repeat(500));
        let chunks = TextChunker::new(100, 20).split_document(&document);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 100, "chunk too long: {}", chunk.text.len());
        }
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let document = doc(&"alpha beta gamma delta ".repeat(60));
        let overlap = 20;
        let chunks = TextChunker::new(120, overlap).split_document(&document);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().rev().take(overlap).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let head: String = pair[1].text.chars().take(overlap).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_window_prefers_whitespace_break() {
        let document = doc(&"sample words all over the place ".repeat(30));
        let chunks = TextChunker::new(100, 20).split_document(&document);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.text.ends_with(char::is_whitespace),
                "expected whitespace break, got {:?}",
                &chunk.text[chunk.text.len().saturating_sub(10)..]
            );
        }
    }

    #[test]
    fn test_hard_cut_when_no_whitespace_in_tolerance() {
        let document = doc(&"x".repeat(250));
        let chunks = TextChunker::new(100, 20).split_document(&document);
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].text.len(), 100);
    }

    #[test]
    fn test_chunks_inherit_document_metadata() {
        let document = doc(&"word ".repeat(100));
        let chunks = TextChunker::new(100, 20).split_document(&document);
        for chunk in &chunks {
            assert_eq!(chunk.document_id, document.id);
            assert_eq!(chunk.source.source_category, "facts");
            assert_eq!(
                chunk.metadata.get("source_category").unwrap(),
                &serde_json::json!("facts")
            );
        }
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let mut document = doc("placeholder");
        document.text = String::new();
        assert!(TextChunker::new(100, 20).split_document(&document).is_empty());
    }

    #[test]
    fn test_multibyte_text_is_not_cut_inside_characters() {
        let document = doc(&"héllo wörld ".repeat(50));
        let chunks = TextChunker::new(64, 16).split_document(&document);
        // Reconstructing each chunk from the original must not panic and the
        // text must remain valid UTF-8 content of the document.
        for chunk in &chunks {
            assert!(document.text.contains(&chunk.text));
        }
    }
}
