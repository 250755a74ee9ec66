//! Reciprocal Rank Fusion (RRF) for combining search results.

use std::collections::{HashMap, HashSet};

use rag_core::{ChunkId, RankedResult};

/// RRF constant (commonly 60).
/// Higher values give more weight to lower-ranked results.
pub const DEFAULT_RRF_K: u32 = 60;

/// Fuse multiple result lists using Reciprocal Rank Fusion.
///
/// RRF score = Σ (1 / (k + rank_i)) for each result list, with ranks
/// starting at 1. Input scores are ignored; only positions matter.
///
/// # Arguments
/// * `results` - Ranked lists, each ordered best-first
/// * `k_constant` - The RRF constant `k`
///
/// # Returns
/// Every distinct chunk with its fused score, sorted descending. Ties keep
/// the order in which chunks were first seen across the input lists.
pub fn fuse(results: Vec<Vec<RankedResult>>, k_constant: u32) -> Vec<RankedResult> {
    let mut positions: HashMap<ChunkId, usize> = HashMap::new();
    let mut fused: Vec<(RankedResult, f64)> = Vec::new();

    for result_list in results {
        let mut seen_in_list = HashSet::new();
        let mut rank = 0u32;

        for result in result_list {
            if !seen_in_list.insert(result.id()) {
                continue;
            }
            rank += 1;
            let rrf_score = 1.0 / (k_constant as f64 + rank as f64);

            match positions.get(&result.id()) {
                Some(&i) => fused[i].1 += rrf_score,
                None => {
                    positions.insert(result.id(), fused.len());
                    fused.push((result, rrf_score));
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal scores
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    fused
        .into_iter()
        .map(|(result, score)| RankedResult::new(result.chunk, score as f32))
        .collect()
}
