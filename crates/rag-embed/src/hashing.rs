//! Feature-hashing embedder.

use async_trait::async_trait;
use tracing::debug;

use rag_core::{tokenize, Embedder, RagError, Result};

use crate::l2_normalize;

/// Embeds text as a signed bag of hashed tokens.
///
/// Each token is hashed with BLAKE3; the first eight bytes pick the bucket
/// and the ninth byte picks the sign. Texts sharing tokens point in similar
/// directions, so cosine similarity tracks lexical overlap.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create an embedder with 384 buckets.
    pub fn new() -> Self {
        Self { dimension: 384 }
    }

    /// Create an embedder with a custom number of buckets.
    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::embedding("dimension must be positive"));
        }
        Ok(Self { dimension })
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();

            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

            embedding[bucket] += sign;
        }

        l2_normalize(embedding)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        debug!("Hashing {} texts into {} buckets", texts.len(), self.dimension);
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_dimension_and_normalization() {
        let embedder = HashingEmbedder::new();
        assert_eq!(embedder.dimension(), 384);

        let embeddings = embedder
            .embed_documents(&["Hello world", "Rust is great"])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);

        let norm: f32 = embeddings[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashingEmbedder::new();
        let e1 = embedder.embed_query("consistent input").await.unwrap();
        let e2 = embedder.embed_query("consistent input").await.unwrap();
        assert_eq!(e1, e2);
    }

    #[tokio::test]
    async fn test_case_and_punctuation_insensitive() {
        let embedder = HashingEmbedder::new();
        let e1 = embedder.embed_query("Error handling!").await.unwrap();
        let e2 = embedder.embed_query("error, HANDLING").await.unwrap();
        assert_eq!(e1, e2);
    }

    #[tokio::test]
    async fn test_same_tokens_identical_direction() {
        let embedder = HashingEmbedder::new();
        let e1 = embedder.embed_query("alpha beta").await.unwrap();
        let e2 = embedder.embed_query("beta alpha").await.unwrap();
        assert!((dot(&e1, &e2) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::with_dimension(16).unwrap();
        let e = embedder.embed_query("...").await.unwrap();
        assert_eq!(e, vec![0.0; 16]);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::with_dimension(0).is_err());
    }
}
