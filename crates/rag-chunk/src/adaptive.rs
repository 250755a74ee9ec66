//! Adaptive chunker that selects the strategy from configuration.

use rag_core::{ChunkData, ChunkStrategy, Chunker, ChunkingConfig, Result};

use crate::{FixedSizeChunker, ParagraphChunker, SectionChunker, SentenceChunker};

/// Adaptive chunker that dispatches to the strategy named in its configuration.
pub struct AdaptiveChunker {
    strategy: ChunkStrategy,
    section: SectionChunker,
    paragraph: ParagraphChunker,
    sentence: SentenceChunker,
    fixed: FixedSizeChunker,
}

impl AdaptiveChunker {
    /// Create an adaptive chunker using section chunking.
    pub fn new() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }

    /// Create an adaptive chunker from configuration.
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self {
            strategy: config.strategy,
            section: SectionChunker::new(),
            paragraph: ParagraphChunker::new(),
            sentence: SentenceChunker::new(config.sentences_per_chunk),
            fixed: FixedSizeChunker::new(config.chunk_size, config.overlap),
        }
    }

    /// Override the configured strategy.
    pub fn with_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn delegate(&self) -> &dyn Chunker {
        match self.strategy {
            ChunkStrategy::Section => &self.section,
            ChunkStrategy::Paragraph => &self.paragraph,
            ChunkStrategy::Sentence => &self.sentence,
            ChunkStrategy::Fixed => &self.fixed,
        }
    }
}

impl Default for AdaptiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for AdaptiveChunker {
    fn chunk(&self, content: &str) -> Result<Vec<ChunkData>> {
        self.delegate().chunk(content)
    }

    fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }
}
