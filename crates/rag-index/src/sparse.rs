//! BM25 keyword index.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use rag_core::{tokenize, Bm25Config, Chunk, RankedResult};

struct SparseEntry {
    term_freq: HashMap<String, u32>,
    len: usize,
    chunk: Arc<Chunk>,
}

/// Okapi BM25 index over tokenized chunk text.
///
/// Scores are
/// `sum_t idf(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * len / avg_len))`
/// with `idf(t) = ln((N - df + 0.5) / (df + 0.5) + 1)`, summed over the
/// distinct query terms.
pub struct Bm25Index {
    params: Bm25Config,
    entries: Vec<SparseEntry>,
    doc_freq: HashMap<String, usize>,
    total_len: usize,
}

impl Bm25Index {
    /// Create an empty index with the given parameters.
    pub fn new(params: Bm25Config) -> Self {
        Self {
            params,
            entries: Vec::new(),
            doc_freq: HashMap::new(),
            total_len: 0,
        }
    }

    /// Index `text` for `chunk`.
    pub fn add(&mut self, text: &str, chunk: Arc<Chunk>) {
        let tokens = tokenize(text);

        let mut term_freq: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *term_freq.entry(token.clone()).or_insert(0) += 1;
        }
        for term in term_freq.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }

        self.total_len += tokens.len();
        self.entries.push(SparseEntry {
            term_freq,
            len: tokens.len(),
            chunk,
        });
    }

    /// Return up to `top_k` chunks by descending BM25 score.
    ///
    /// Chunks sharing no term with the query are left out. Ties keep
    /// insertion order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RankedResult> {
        if self.entries.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let terms: Vec<(String, f64)> = tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .filter_map(|t| {
                let idf = self.idf(&t)?;
                Some((t, idf))
            })
            .collect();

        if terms.is_empty() {
            return Vec::new();
        }

        let k1 = self.params.k1 as f64;
        let b = self.params.b as f64;
        let avg_len = self.avg_len() as f64;

        let mut results: Vec<RankedResult> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let mut score = 0.0f64;
                let mut matched = false;
                for (term, idf) in &terms {
                    let Some(&tf) = entry.term_freq.get(term) else {
                        continue;
                    };
                    matched = true;
                    let tf = tf as f64;
                    let norm = if avg_len > 0.0 {
                        1.0 - b + b * entry.len as f64 / avg_len
                    } else {
                        1.0
                    };
                    score += idf * tf * (k1 + 1.0) / (tf + k1 * norm);
                }
                matched.then(|| RankedResult::new(entry.chunk.clone(), score as f32))
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!(
            "BM25 search over {} terms returned {} results",
            terms.len(),
            results.len()
        );

        results
    }

    /// Inverse document frequency of `term`, or `None` if no chunk contains it.
    fn idf(&self, term: &str) -> Option<f64> {
        let df = *self.doc_freq.get(term)? as f64;
        let n = self.entries.len() as f64;
        Some(((n - df + 0.5) / (df + 0.5) + 1.0).ln())
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct terms seen.
    pub fn vocabulary(&self) -> usize {
        self.doc_freq.len()
    }

    /// Mean chunk length in tokens.
    pub fn avg_len(&self) -> f32 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.total_len as f32 / self.entries.len() as f32
    }
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new(Bm25Config::default())
    }
}
