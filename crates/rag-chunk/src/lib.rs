//! rag-chunk - Chunking strategies and contextual augmentation
//!
//! This crate splits documents into retrievable chunks and, optionally,
//! prepends model-generated context to each chunk before it is indexed.
//!
//! # Chunkers
//!
//! - [`SectionChunker`]: Splits on structural headers (markdown `## ` headings
//!   and ALL-CAPS heading lines).
//! - [`ParagraphChunker`]: Splits on blank lines.
//! - [`SentenceChunker`]: Groups a fixed number of sentences per chunk.
//! - [`FixedSizeChunker`]: Fixed-size character windows with overlap.
//! - [`AdaptiveChunker`]: Dispatches to one of the above from configuration.
//!
//! # Example
//!
//! ```rust
//! use rag_chunk::{Chunker, SectionChunker};
//!
//! let chunker = SectionChunker::new();
//! let chunks = chunker.chunk("## Intro\nHello\n## Details\nWorld").unwrap();
//! assert_eq!(chunks.len(), 2);
//! ```

mod adaptive;
mod contextual;
mod fixed;
mod paragraph;
mod section;

pub use adaptive::AdaptiveChunker;
pub use contextual::{ContextualAugmenter, SourceContext};
pub use fixed::FixedSizeChunker;
pub use paragraph::{ParagraphChunker, SentenceChunker};
pub use section::SectionChunker;

// Re-export types for convenience
pub use rag_core::{ChunkData, ChunkStrategy, Chunker, ChunkingConfig};
