//! Fixed-size character window chunker.

use rag_core::{ChunkData, ChunkStrategy, Chunker, RagError, Result};

/// Splits text into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, content: &str) -> Result<Vec<ChunkData>> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(RagError::chunking(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }

        let chars: Vec<char> = content.chars().collect();
        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();
            let text = text.trim();

            if !text.is_empty() {
                chunks.push(ChunkData {
                    content: text.to_string(),
                    header: None,
                    strategy: ChunkStrategy::Fixed,
                });
            }

            if end == chars.len() {
                break;
            }
            start += step;
        }

        Ok(chunks)
    }

    fn strategy(&self) -> ChunkStrategy {
        ChunkStrategy::Fixed
    }
}
