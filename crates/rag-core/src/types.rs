//! Core domain types for the retrieval engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use ulid::Ulid;

/// Caller-defined metadata attached to a chunk.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Identity of a chunk inside one retriever.
pub type ChunkId = Ulid;

/// How a document was split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Split on structural headers (markdown `## ` or ALL-CAPS lines).
    Section,
    /// Split on blank lines.
    Paragraph,
    /// Group a fixed number of sentences.
    Sentence,
    /// Fixed-size character windows with overlap.
    Fixed,
}

impl std::fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Section => "section",
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::Fixed => "fixed",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ChunkStrategy {
    type Err = crate::error::RagError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "section" => Ok(Self::Section),
            "paragraph" => Ok(Self::Paragraph),
            "sentence" => Ok(Self::Sentence),
            "fixed" | "fixed_size" => Ok(Self::Fixed),
            other => Err(crate::error::RagError::invalid_argument(format!(
                "unknown chunk strategy: {}",
                other
            ))),
        }
    }
}

/// Raw chunk produced by a chunker, before it is indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    /// Chunk text content.
    pub content: String,

    /// Section header the chunk falls under, when the strategy knows one.
    pub header: Option<String>,

    /// Strategy that produced the chunk.
    pub strategy: ChunkStrategy,
}

/// An indexed chunk: the atomic retrievable unit.
///
/// Immutable once created; dense and sparse entries share it through an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier (ULID).
    pub id: ChunkId,

    /// Text the chunk was indexed with.
    pub content: String,

    /// Caller-defined metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Chunk {
    /// Create a new chunk with a fresh identifier.
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: Ulid::new(),
            content: content.into(),
            metadata,
        }
    }

    /// Look up a string-valued metadata entry.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// A (chunk, score) pair handed between pipeline stages.
///
/// Score semantics depend on the stage: cosine distance for dense search
/// (lower is better), BM25 relevance for sparse search and RRF score after
/// fusion (higher is better).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// The matched chunk.
    pub chunk: Arc<Chunk>,

    /// Stage-specific score.
    pub score: f32,
}

impl RankedResult {
    /// Create a ranked result.
    pub fn new(chunk: Arc<Chunk>, score: f32) -> Self {
        Self { chunk, score }
    }

    /// Identity of the underlying chunk.
    pub fn id(&self) -> ChunkId {
        self.chunk.id
    }

    /// Metadata of the underlying chunk.
    pub fn metadata(&self) -> &Metadata {
        &self.chunk.metadata
    }
}

/// Statistics about a retriever's indexes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed chunks.
    pub chunks: usize,

    /// Dense vector dimensionality, once known.
    pub dimension: Option<usize>,

    /// Number of distinct terms in the sparse index.
    pub vocabulary: usize,

    /// Average chunk length in tokens.
    pub avg_chunk_len: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_strategy_from_str() {
        assert_eq!("section".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Section);
        assert_eq!("FIXED_SIZE".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Fixed);
        assert!("nope".parse::<ChunkStrategy>().is_err());
    }

    #[test]
    fn test_chunk_ids_are_unique() {
        let a = Chunk::new("same text", Metadata::new());
        let b = Chunk::new("same text", Metadata::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_metadata_str() {
        let mut metadata = Metadata::new();
        metadata.insert("section".to_string(), serde_json::json!("Risk Factors"));
        metadata.insert("position".to_string(), serde_json::json!(3));
        let chunk = Chunk::new("text", metadata);

        assert_eq!(chunk.metadata_str("section"), Some("Risk Factors"));
        assert_eq!(chunk.metadata_str("position"), None);
        assert_eq!(chunk.metadata_str("missing"), None);
    }

    #[test]
    fn test_ranked_result_serializes() {
        let chunk = Arc::new(Chunk::new("hello", Metadata::new()));
        let result = RankedResult::new(chunk.clone(), 0.5);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["chunk"]["content"], "hello");
        assert_eq!(result.id(), chunk.id);
    }
}
