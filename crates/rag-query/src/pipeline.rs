//! Ingestion and query pipeline.
//!
//! Ingestion: chunk → (optionally) augment → batch-embed → index.
//! Query: embed → hybrid search → (optionally) re-rank.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use rag_chunk::{AdaptiveChunker, ContextualAugmenter};
use rag_core::{ChunkId, Chunker, Embedder, Metadata, RagConfig, RagError, RankedResult, Result};

use crate::retriever::HybridRetriever;

/// Ties a chunker, an embedder and an optional augmenter to a retriever.
pub struct RagPipeline {
    chunker: Box<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    augmenter: Option<ContextualAugmenter>,
    retriever: HybridRetriever,
}

impl RagPipeline {
    /// Create a pipeline with the default section chunker.
    pub fn new(embedder: Arc<dyn Embedder>, retriever: HybridRetriever) -> Self {
        Self {
            chunker: Box::new(AdaptiveChunker::new()),
            embedder,
            augmenter: None,
            retriever,
        }
    }

    /// Create a pipeline whose chunker and retriever follow `config`.
    pub fn from_config(config: &RagConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self::new(embedder, HybridRetriever::from_config(config))
            .with_chunker(AdaptiveChunker::from_config(&config.chunking))
    }

    /// Replace the chunker.
    pub fn with_chunker(mut self, chunker: impl Chunker + 'static) -> Self {
        self.chunker = Box::new(chunker);
        self
    }

    /// Augment chunks with document context before indexing.
    pub fn with_augmenter(mut self, augmenter: ContextualAugmenter) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    /// The underlying retriever.
    pub fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }

    /// Chunk, embed and index `document`.
    ///
    /// Each chunk's metadata records `source`, `chunk_index`, `header` (when
    /// the chunker found one), `content` (the indexed text) and
    /// `original_content` (the text before augmentation). An empty document
    /// indexes nothing.
    pub async fn ingest(&self, source: &str, document: &str) -> Result<Vec<ChunkId>> {
        let chunks = self.chunker.chunk(document)?;
        if chunks.is_empty() {
            debug!("No chunks in {}", source);
            return Ok(Vec::new());
        }

        let originals: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let texts = match &self.augmenter {
            Some(augmenter) => augmenter.augment_all(document, &originals).await,
            None => originals.clone(),
        };

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_documents(&refs).await?;
        if embeddings.len() != texts.len() {
            return Err(RagError::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let mut ids = Vec::with_capacity(chunks.len());
        for (index, ((chunk, text), embedding)) in
            chunks.iter().zip(&texts).zip(embeddings).enumerate()
        {
            let mut metadata = Metadata::new();
            metadata.insert("source".to_string(), json!(source));
            metadata.insert("chunk_index".to_string(), json!(index));
            if let Some(header) = &chunk.header {
                metadata.insert("header".to_string(), json!(header));
            }
            metadata.insert("content".to_string(), json!(text));
            metadata.insert("original_content".to_string(), json!(chunk.content));

            ids.push(self.retriever.add_document(text, embedding, metadata)?);
        }

        info!("Indexed {} chunks from {}", ids.len(), source);

        Ok(ids)
    }

    /// Embed `query` and run a hybrid search.
    pub async fn query(&self, query: &str, top_k: usize) -> Result<Vec<RankedResult>> {
        let embedding = self.embedder.embed_query(query).await?;
        self.retriever.search(query, &embedding, top_k)
    }

    /// Embed `query` and run a re-ranked hybrid search.
    pub async fn query_with_reranking(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RankedResult>> {
        let embedding = self.embedder.embed_query(query).await?;
        self.retriever
            .search_with_reranking(query, &embedding, top_k)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_chunk::ParagraphChunker;
    use rag_core::{AugmentConfig, JudgeError};
    use rag_embed::HashingEmbedder;
    use rag_llm::MockJudge;

    const DOC: &str =
        "## Setup\nInstall the toolchain with rustup.\n\n## Usage\nRun cargo build to compile the project.";

    fn pipeline() -> RagPipeline {
        RagPipeline::new(Arc::new(HashingEmbedder::new()), HybridRetriever::new())
    }

    #[tokio::test]
    async fn test_ingest_records_metadata() {
        let pipeline = pipeline();
        let ids = pipeline.ingest("guide.md", DOC).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(pipeline.retriever().len(), 2);

        let results = pipeline.query("cargo build", 1).await.unwrap();
        let chunk = &results[0].chunk;
        assert_eq!(chunk.metadata_str("source"), Some("guide.md"));
        assert_eq!(chunk.metadata_str("header"), Some("Usage"));
        assert_eq!(chunk.metadata["chunk_index"], 1);
        assert_eq!(chunk.metadata_str("content"), Some(chunk.content.as_str()));
        assert_eq!(chunk.metadata_str("original_content"), Some(chunk.content.as_str()));
    }

    #[tokio::test]
    async fn test_empty_document_indexes_nothing() {
        let pipeline = pipeline();
        assert!(pipeline.ingest("empty.md", "  \n\n ").await.unwrap().is_empty());
        assert!(pipeline.retriever().is_empty());
        assert!(pipeline.query("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_augmented_text_is_indexed() {
        let judge = Arc::new(MockJudge::replying("This chunk is from an installation guide."));
        let pipeline = pipeline()
            .with_chunker(ParagraphChunker::new())
            .with_augmenter(ContextualAugmenter::new(judge.clone(), AugmentConfig::default()));

        pipeline
            .ingest("guide.md", "Install the toolchain.\n\nRun the build.")
            .await
            .unwrap();
        assert_eq!(judge.calls(), 2);

        // "installation" only exists in the generated context
        let results = pipeline.query("installation", 2).await.unwrap();
        let chunk = &results[0].chunk;
        assert!(chunk.content.starts_with("This chunk is from an installation guide.\n\n"));
        assert_eq!(chunk.metadata_str("content"), Some(chunk.content.as_str()));
        assert!(chunk
            .metadata_str("original_content")
            .is_some_and(|c| !c.contains("installation")));
    }

    #[tokio::test]
    async fn test_failed_augmentation_indexes_original() {
        let judge = Arc::new(MockJudge::failing(JudgeError::EmptyResponse));
        let pipeline = pipeline()
            .with_augmenter(ContextualAugmenter::new(judge, AugmentConfig::default()));

        pipeline.ingest("guide.md", DOC).await.unwrap();
        let results = pipeline.query("rustup", 1).await.unwrap();
        assert_eq!(
            results[0].chunk.content,
            "## Setup\nInstall the toolchain with rustup."
        );
    }

    #[tokio::test]
    async fn test_from_config_uses_strategy() {
        let mut config = RagConfig::default();
        config.chunking.strategy = rag_core::ChunkStrategy::Paragraph;

        let pipeline = RagPipeline::from_config(&config, Arc::new(HashingEmbedder::new()));
        assert_eq!(pipeline.ingest("guide.md", DOC).await.unwrap().len(), 2);

        let mut config = RagConfig::default();
        config.chunking.strategy = rag_core::ChunkStrategy::Sentence;
        config.chunking.sentences_per_chunk = 1;
        let pipeline = RagPipeline::from_config(&config, Arc::new(HashingEmbedder::new()));
        assert_eq!(
            pipeline
                .ingest("notes.txt", "One. Two. Three.")
                .await
                .unwrap()
                .len(),
            3
        );
    }
}
