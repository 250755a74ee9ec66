//! Hybrid retriever over a dense and a sparse index.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use rag_core::{
    Bm25Config, Chunk, ChunkId, IndexStats, JudgeError, Metadata, RagConfig, RagError,
    RankedResult, Result, SearchConfig,
};
use rag_index::{Bm25Index, DenseIndex};

use crate::fusion::fuse;
use crate::rerank::LlmReranker;

/// The two indexes, always mutated together.
struct Indexes {
    dense: DenseIndex,
    sparse: Bm25Index,
}

impl Indexes {
    fn new(bm25: Bm25Config) -> Self {
        Self {
            dense: DenseIndex::new(),
            sparse: Bm25Index::new(bm25),
        }
    }

    fn add(&mut self, text: &str, embedding: Vec<f32>, metadata: Metadata) -> Result<ChunkId> {
        let chunk = Arc::new(Chunk::new(text, metadata));
        let id = chunk.id;

        // Dense first: it is the only side that can reject the entry
        self.dense.add(embedding, chunk.clone())?;
        self.sparse.add(text, chunk);

        Ok(id)
    }
}

/// Hybrid search over dense and BM25 indexes, fused with RRF.
///
/// Reads (`search`) share the index lock; writes (`add_document`,
/// `rebuild`) take it exclusively.
pub struct HybridRetriever {
    indexes: RwLock<Indexes>,
    search: SearchConfig,
    bm25: Bm25Config,
    reranker: Option<LlmReranker>,
}

impl HybridRetriever {
    /// Create an empty retriever with default parameters and no re-ranker.
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default(), Bm25Config::default())
    }

    /// Create an empty retriever from the `search` and `bm25` sections.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::with_config(config.search.clone(), config.bm25)
    }

    fn with_config(search: SearchConfig, bm25: Bm25Config) -> Self {
        Self {
            indexes: RwLock::new(Indexes::new(bm25)),
            search,
            bm25,
            reranker: None,
        }
    }

    /// Attach a re-ranker for [`search_with_reranking`](Self::search_with_reranking).
    pub fn with_reranker(mut self, reranker: LlmReranker) -> Self {
        self.reranker = Some(reranker);
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Indexes>> {
        self.indexes
            .read()
            .map_err(|e| RagError::internal(format!("Index lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Indexes>> {
        self.indexes
            .write()
            .map_err(|e| RagError::internal(format!("Index lock poisoned: {}", e)))
    }

    /// Add one chunk to both indexes.
    ///
    /// `text` is what BM25 indexes and what results carry as content.
    /// Fails with `DimensionMismatch` if `embedding` does not match the
    /// vectors already stored, in which case neither index changes.
    pub fn add_document(
        &self,
        text: &str,
        embedding: Vec<f32>,
        metadata: Metadata,
    ) -> Result<ChunkId> {
        let id = self.write()?.add(text, embedding, metadata)?;
        debug!("Indexed chunk {}", id);
        Ok(id)
    }

    /// Replace both indexes with `entries`.
    ///
    /// The new indexes are built off to the side and swapped in under the
    /// writer lock; if any entry is rejected the current indexes are kept.
    pub fn rebuild<I>(&self, entries: I) -> Result<Vec<ChunkId>>
    where
        I: IntoIterator<Item = (String, Vec<f32>, Metadata)>,
    {
        let mut fresh = Indexes::new(self.bm25);
        let ids = entries
            .into_iter()
            .map(|(text, embedding, metadata)| fresh.add(&text, embedding, metadata))
            .collect::<Result<Vec<_>>>()?;

        *self.write()? = fresh;
        info!("Rebuilt indexes with {} chunks", ids.len());

        Ok(ids)
    }

    /// Hybrid search: dense and BM25 results fused with RRF.
    ///
    /// Each index is asked for `top_k * oversample` results; the fused list
    /// is cut to `top_k`. An empty index contributes nothing.
    pub fn search(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RankedResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let fetch_k = top_k.saturating_mul(self.search.oversample);
        let (dense_results, sparse_results) = {
            let indexes = self.read()?;
            (
                indexes.dense.search(query_embedding, fetch_k)?,
                indexes.sparse.search(query_text, fetch_k),
            )
        };

        debug!(
            "Dense search returned {} results, BM25 search returned {} results",
            dense_results.len(),
            sparse_results.len()
        );

        let mut fused = fuse(vec![dense_results, sparse_results], self.search.rrf_k);
        fused.truncate(top_k);

        debug!("Fused to {} results", fused.len());

        Ok(fused)
    }

    /// Hybrid search refined by the re-ranker.
    ///
    /// Fetches `top_k * candidate_multiplier` fused candidates and lets the
    /// judge re-order them. Judge failures, or a missing re-ranker, yield
    /// exactly what [`search`](Self::search) returns for `top_k`; only
    /// search errors are returned.
    pub async fn search_with_reranking(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RankedResult>> {
        let Some(reranker) = &self.reranker else {
            warn!("Re-ranking requested, keeping fused order: {}", JudgeError::NotConfigured);
            return self.search(query_text, query_embedding, top_k);
        };

        let candidates = self.search(
            query_text,
            query_embedding,
            reranker.candidate_count(top_k),
        )?;

        match reranker.rerank(query_text, candidates, top_k).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!("Re-ranking failed, keeping fused order: {}", e);
                self.search(query_text, query_embedding, top_k)
            }
        }
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.read().map(|i| i.dense.len()).unwrap_or(0)
    }

    /// Whether nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dense vector dimensionality, once known.
    pub fn dimension(&self) -> Option<usize> {
        self.read().ok().and_then(|i| i.dense.dimension())
    }

    /// Index statistics.
    pub fn stats(&self) -> Result<IndexStats> {
        let indexes = self.read()?;
        Ok(IndexStats {
            chunks: indexes.dense.len(),
            dimension: indexes.dense.dimension(),
            vocabulary: indexes.sparse.vocabulary(),
            avg_chunk_len: indexes.sparse.avg_len(),
        })
    }
}

impl Default for HybridRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_core::RerankConfig;
    use rag_llm::MockJudge;

    fn names(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.chunk.content.as_str()).collect()
    }

    fn retriever() -> HybridRetriever {
        let retriever = HybridRetriever::new();
        retriever
            .add_document("rust ownership rules", vec![1.0, 0.0], Metadata::new())
            .unwrap();
        retriever
            .add_document("python garbage collection", vec![0.0, 1.0], Metadata::new())
            .unwrap();
        retriever
            .add_document("rust borrow checker", vec![0.9, 0.1], Metadata::new())
            .unwrap();
        retriever
    }

    #[test]
    fn test_search_fuses_both_indexes() {
        let retriever = retriever();
        let results = retriever.search("garbage", &[1.0, 0.0], 3).unwrap();

        assert_eq!(results.len(), 3);
        // Top dense hit and the only BM25 hit are both ranked first in one list
        let top = names(&results[..2]);
        assert!(top.contains(&"rust ownership rules"));
        assert!(top.contains(&"python garbage collection"));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_empty_retriever() {
        let retriever = HybridRetriever::new();
        assert!(retriever.search("anything", &[1.0, 2.0], 5).unwrap().is_empty());
        assert!(retriever.is_empty());
        assert_eq!(retriever.dimension(), None);
        assert_eq!(retriever.stats().unwrap(), IndexStats::default());
    }

    #[test]
    fn test_add_rejects_wrong_dimension_atomically() {
        let retriever = retriever();
        let err = retriever
            .add_document("rust macros", vec![1.0, 0.0, 0.0], Metadata::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "DIMENSION_MISMATCH");

        assert_eq!(retriever.len(), 3);
        let results = retriever.search("macros", &[1.0, 0.0], 3).unwrap();
        assert!(results.iter().all(|r| r.chunk.content != "rust macros"));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let retriever = retriever();
        assert!(retriever.search("rust", &[1.0], 3).is_err());
    }

    #[test]
    fn test_oversample() {
        let build = |oversample| {
            let config = RagConfig {
                search: SearchConfig {
                    oversample,
                    ..SearchConfig::default()
                },
                ..RagConfig::default()
            };
            let retriever = HybridRetriever::from_config(&config);
            retriever.add_document("alpha", vec![1.0, 0.0], Metadata::new()).unwrap();
            retriever.add_document("beta", vec![0.8, 0.2], Metadata::new()).unwrap();
            retriever.add_document("gamma", vec![0.0, 1.0], Metadata::new()).unwrap();
            retriever
        };

        // gamma is last by distance; only a deeper dense fetch lets it
        // collect a dense contribution on top of its BM25 one
        let results = build(1).search("gamma", &[1.0, 0.0], 2).unwrap();
        assert_eq!(names(&results), vec!["alpha", "gamma"]);

        let results = build(3).search("gamma", &[1.0, 0.0], 2).unwrap();
        assert_eq!(names(&results), vec!["gamma", "alpha"]);
    }

    #[test]
    fn test_rebuild_replaces_everything() {
        let retriever = retriever();
        let ids = retriever
            .rebuild(vec![(
                "fresh start".to_string(),
                vec![0.0, 0.0, 1.0],
                Metadata::new(),
            )])
            .unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(retriever.len(), 1);
        assert_eq!(retriever.dimension(), Some(3));
        let results = retriever.search("rust", &[0.0, 0.0, 1.0], 5).unwrap();
        assert_eq!(names(&results), vec!["fresh start"]);
    }

    #[test]
    fn test_rebuild_failure_keeps_old_indexes() {
        let retriever = retriever();
        let result = retriever.rebuild(vec![
            ("a".to_string(), vec![1.0], Metadata::new()),
            ("b".to_string(), vec![1.0, 2.0], Metadata::new()),
        ]);

        assert!(result.is_err());
        assert_eq!(retriever.len(), 3);
        assert_eq!(retriever.dimension(), Some(2));
    }

    #[test]
    fn test_stats() {
        let stats = retriever().stats().unwrap();
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.dimension, Some(2));
        assert_eq!(stats.vocabulary, 8);
        assert!((stats.avg_chunk_len - 3.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_reranking_without_judge_is_plain_search() {
        let retriever = retriever();
        let plain = retriever.search("rust", &[1.0, 0.0], 2).unwrap();
        let reranked = retriever
            .search_with_reranking("rust", &[1.0, 0.0], 2)
            .await
            .unwrap();
        assert_eq!(names(&plain), names(&reranked));
    }

    #[tokio::test]
    async fn test_reranking_uses_judge() {
        let judge = Arc::new(MockJudge::replying(r#"["doc_3"]"#));
        let retriever = retriever().with_reranker(LlmReranker::new(
            judge.clone(),
            RerankConfig::default(),
        ));

        let plain = retriever.search("rust", &[1.0, 0.0], 3).unwrap();
        let reranked = retriever
            .search_with_reranking("rust", &[1.0, 0.0], 2)
            .await
            .unwrap();

        assert_eq!(judge.calls(), 1);
        assert_eq!(reranked.len(), 2);
        assert_eq!(reranked[0].chunk.content, plain[2].chunk.content);
    }

    #[tokio::test]
    async fn test_failed_reranking_is_plain_search() {
        let judges = [
            MockJudge::failing(JudgeError::Request("connection refused".to_string())),
            MockJudge::replying("the first one, probably"),
            MockJudge::replying(r#"["doc_1", "doc_42"]"#),
        ];

        for judge in judges {
            let retriever = HybridRetriever::new()
                .with_reranker(LlmReranker::new(Arc::new(judge), RerankConfig::default()));
            retriever.add_document("alpha", vec![1.0, 0.0], Metadata::new()).unwrap();
            retriever.add_document("beta", vec![0.8, 0.2], Metadata::new()).unwrap();
            retriever.add_document("gamma", vec![0.0, 1.0], Metadata::new()).unwrap();

            // The wider candidate fetch fuses gamma above alpha
            let candidates = retriever.search("gamma", &[1.0, 0.0], 4).unwrap();
            assert_eq!(names(&candidates[..2]), vec!["gamma", "alpha"]);

            let plain = retriever.search("gamma", &[1.0, 0.0], 2).unwrap();
            let reranked = retriever
                .search_with_reranking("gamma", &[1.0, 0.0], 2)
                .await
                .unwrap();
            assert_eq!(names(&plain), vec!["alpha", "gamma"]);
            assert_eq!(names(&reranked), names(&plain));
        }
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let retriever = retriever();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let results = retriever.search("rust", &[1.0, 0.0], 10).unwrap();
                        // Each search sees a consistent snapshot of both indexes
                        assert!((3..=10).contains(&results.len()));
                        assert_eq!(results[0].chunk.content, "rust ownership rules");
                    }
                });
            }
            s.spawn(|| {
                for i in 0..20 {
                    let text = format!("appendix {}", i);
                    retriever.add_document(&text, vec![0.0, 1.0], Metadata::new()).unwrap();
                }
            });
        });

        let stats = retriever.stats().unwrap();
        assert_eq!(stats.chunks, 23);
        assert_eq!(retriever.search("appendix", &[0.0, 1.0], 30).unwrap().len(), 23);
    }
}
