//! rag-index - In-memory search indexes
//!
//! This crate provides the two append-only indexes the hybrid retriever
//! coordinates:
//!
//! - [`DenseIndex`]: exhaustive nearest-neighbour search by cosine distance.
//! - [`Bm25Index`]: keyword relevance search with the BM25 ranking function.
//!
//! Both hold their chunks through `Arc<Chunk>`, so a chunk added to both
//! indexes is shared rather than copied.

mod dense;
mod sparse;

pub use dense::{cosine_distance, cosine_similarity, DenseIndex};
pub use sparse::Bm25Index;
