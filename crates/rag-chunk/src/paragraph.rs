//! Paragraph and sentence chunkers.

use rag_core::{ChunkData, ChunkStrategy, Chunker, Result};

/// Splits text on blank lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphChunker;

impl ParagraphChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, content: &str) -> Result<Vec<ChunkData>> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in content.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    chunks.push(ChunkData {
                        content: current.join("\n").trim().to_string(),
                        header: None,
                        strategy: ChunkStrategy::Paragraph,
                    });
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }

        Ok(chunks)
    }

    fn strategy(&self) -> ChunkStrategy {
        ChunkStrategy::Paragraph
    }
}

/// Groups consecutive sentences into chunks.
///
/// Sentences end at `.`, `!` or `?` followed by whitespace.
#[derive(Debug, Clone, Copy)]
pub struct SentenceChunker {
    sentences_per_chunk: usize,
}

impl SentenceChunker {
    /// Create a chunker grouping `sentences_per_chunk` sentences (minimum 1).
    pub fn new(sentences_per_chunk: usize) -> Self {
        Self {
            sentences_per_chunk: sentences_per_chunk.max(1),
        }
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Split text into trimmed sentences.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let sentence = text[start..i].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = i;
        }
        prev = Some(c);
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

impl Chunker for SentenceChunker {
    fn chunk(&self, content: &str) -> Result<Vec<ChunkData>> {
        let sentences = split_sentences(content);

        Ok(sentences
            .chunks(self.sentences_per_chunk)
            .map(|group| ChunkData {
                content: group.join(" "),
                header: None,
                strategy: ChunkStrategy::Sentence,
            })
            .collect())
    }

    fn strategy(&self) -> ChunkStrategy {
        ChunkStrategy::Sentence
    }
}
