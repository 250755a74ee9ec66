//! rag-embed - Deterministic embedding providers
//!
//! The retrieval engine treats the embedding provider as a black box behind
//! the [`Embedder`] trait. This crate provides providers that need no model
//! runtime:
//!
//! - [`HashingEmbedder`]: signed feature hashing of tokens into a fixed number
//!   of buckets, L2-normalised.
//! - [`TopicEmbedder`]: one dimension per keyword family, normalised to a
//!   distribution over families.

mod hashing;
mod topic;

pub use hashing::HashingEmbedder;
pub use topic::TopicEmbedder;

// Re-export the Embedder trait for convenience
pub use rag_core::Embedder;

/// L2 normalize a vector in place; zero vectors are left untouched.
pub(crate) fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
