//! Dense vector index with cosine distance.

use std::sync::Arc;

use tracing::debug;

use rag_core::{Chunk, RagError, RankedResult, Result};

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Defined as 0 when either vector has zero magnitude. Fails with
/// `DimensionMismatch` when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RagError::dimension_mismatch(a.len(), b.len()));
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Cosine distance `1 - cosine_similarity(a, b)`, in `[0, 2]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    Ok(1.0 - cosine_similarity(a, b)?)
}

struct DenseEntry {
    vector: Vec<f32>,
    chunk: Arc<Chunk>,
}

/// Exhaustive cosine-distance index.
///
/// The dimensionality is fixed either up front or by the first vector added.
#[derive(Default)]
pub struct DenseIndex {
    dimension: Option<usize>,
    entries: Vec<DenseEntry>,
}

impl DenseIndex {
    /// Create an empty index whose dimension is set by the first vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with a fixed dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            entries: Vec::new(),
        }
    }

    /// Store a vector for `chunk`.
    pub fn add(&mut self, vector: Vec<f32>, chunk: Arc<Chunk>) -> Result<()> {
        if vector.is_empty() {
            return Err(RagError::invalid_argument("embedding vector is empty"));
        }
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(RagError::dimension_mismatch(expected, vector.len()));
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }

        self.entries.push(DenseEntry { vector, chunk });
        Ok(())
    }

    /// Return up to `top_k` chunks by ascending cosine distance.
    ///
    /// Ties keep insertion order. An empty index answers with no results.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RankedResult>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.dimension {
            if expected != query.len() {
                return Err(RagError::dimension_mismatch(expected, query.len()));
            }
        }

        let mut results = self
            .entries
            .iter()
            .map(|entry| {
                let distance = cosine_distance(query, &entry.vector)?;
                Ok(RankedResult::new(entry.chunk.clone(), distance))
            })
            .collect::<Result<Vec<_>>>()?;

        results.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!("Dense search returned {} results", results.len());

        Ok(results)
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimensionality, once known.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
