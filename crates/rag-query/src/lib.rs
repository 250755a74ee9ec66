//! rag-query - Hybrid retrieval and ranking
//!
//! This crate combines dense (cosine) and sparse (BM25) search using
//! Reciprocal Rank Fusion (RRF), and optionally refines the fused ranking
//! with an LLM relevance judge.
//!
//! # Features
//!
//! - Hybrid search over an in-memory [`HybridRetriever`]
//! - Reciprocal Rank Fusion for combining ranked lists
//! - Best-effort LLM re-ranking that falls back to the fused order
//! - An ingestion [`RagPipeline`]: chunk, augment, embed, index
//!
//! # Example
//!
//! ```rust,ignore
//! use rag_query::HybridRetriever;
//!
//! let retriever = HybridRetriever::new();
//! retriever.add_document("Rust error handling", embedding, metadata)?;
//! let results = retriever.search("error handling", &query_embedding, 5)?;
//! ```

mod fusion;
mod pipeline;
mod rerank;
mod retriever;

pub use fusion::{fuse, DEFAULT_RRF_K};
pub use pipeline::RagPipeline;
pub use rerank::{build_prompt, parse_ranking, LlmReranker};
pub use retriever::HybridRetriever;

// Re-export for convenience
pub use rag_core::{IndexStats, Metadata, RankedResult};
