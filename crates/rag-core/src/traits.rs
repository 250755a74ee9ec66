//! Core traits defining the interfaces between components.

use async_trait::async_trait;

use crate::error::{JudgeError, Result};
use crate::types::{ChunkData, ChunkStrategy};

/// Embedding provider.
///
/// Assumed deterministic for a given text; every vector it returns has
/// length [`Embedder::dimension`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of document texts.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}

/// External relevance-judging model (text in, text out).
///
/// Used for re-ranking and contextual augmentation. Callers must treat the
/// output as untrusted and parse it defensively.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Send a single-turn prompt and return the model's text reply.
    async fn complete(&self, prompt: &str, max_tokens: u32)
        -> std::result::Result<String, JudgeError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Chunking strategy trait.
pub trait Chunker: Send + Sync {
    /// Chunk text content into pieces.
    ///
    /// An empty document produces zero chunks and is not an error.
    fn chunk(&self, content: &str) -> Result<Vec<ChunkData>>;

    /// The strategy this chunker implements.
    fn strategy(&self) -> ChunkStrategy;
}
