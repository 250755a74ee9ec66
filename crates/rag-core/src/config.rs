//! Configuration types for the retrieval engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::ChunkStrategy;

/// Main configuration for the retrieval engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Search configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// BM25 parameters.
    #[serde(default)]
    pub bm25: Bm25Config,

    /// LLM re-ranking configuration.
    #[serde(default)]
    pub rerank: RerankConfig,

    /// Contextual augmentation configuration.
    #[serde(default)]
    pub augment: AugmentConfig,

    /// Chunking configuration.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Judging model client configuration.
    #[serde(default)]
    pub judge: JudgeConfig,
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// RRF constant k.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,

    /// Each sub-index is queried for `top_k * oversample` results before fusion.
    #[serde(default = "default_one")]
    pub oversample: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            rrf_k: 60,
            oversample: 1,
        }
    }
}

/// BM25 ranking parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term frequency saturation.
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Length normalization (0 = none, 1 = full).
    #[serde(default = "default_b")]
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// LLM re-ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    /// Fused candidates fetched per requested result.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,

    /// Timeout for the judging call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Characters of chunk content shown to the judge per candidate.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Token budget for the judge's reply.
    #[serde(default = "default_rerank_max_tokens")]
    pub max_tokens: u32,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: 2,
            timeout_ms: 30_000,
            max_content_chars: 500,
            max_tokens: 500,
        }
    }
}

/// Contextual augmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Chunks from the start of the document shown in windowed mode.
    #[serde(default = "default_window")]
    pub starter_chunks: usize,

    /// Chunks immediately before the target shown in windowed mode.
    #[serde(default = "default_window")]
    pub nearby_chunks: usize,

    /// Documents longer than this (in characters) use the windowed strategy.
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,

    /// Timeout for each judging call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Token budget for the generated context.
    #[serde(default = "default_augment_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            starter_chunks: 2,
            nearby_chunks: 2,
            max_document_chars: 100_000,
            timeout_ms: 30_000,
            max_tokens: 200,
        }
    }
}

/// Chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Strategy used to split documents.
    #[serde(default = "default_strategy")]
    pub strategy: ChunkStrategy,

    /// Characters per chunk for fixed-size chunking.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlapping characters between fixed-size chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Sentences per chunk for sentence chunking.
    #[serde(default = "default_sentences_per_chunk")]
    pub sentences_per_chunk: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Section,
            chunk_size: 500,
            overlap: 50,
            sentences_per_chunk: 3,
        }
    }
}

/// Judging model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
        }
    }
}

// Default value functions

fn default_one() -> usize {
    1
}

fn default_top_k() -> usize {
    10
}

fn default_rrf_k() -> u32 {
    60
}

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

fn default_candidate_multiplier() -> usize {
    2
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_content_chars() -> usize {
    500
}

fn default_rerank_max_tokens() -> u32 {
    500
}

fn default_window() -> usize {
    2
}

fn default_max_document_chars() -> usize {
    100_000
}

fn default_augment_max_tokens() -> u32 {
    200
}

fn default_strategy() -> ChunkStrategy {
    ChunkStrategy::Section
}

fn default_chunk_size() -> usize {
    500
}

fn default_overlap() -> usize {
    50
}

fn default_sentences_per_chunk() -> usize {
    3
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

impl RagConfig {
    /// Load configuration from file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::RagError::config(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> crate::error::Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("hybrid-rag").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("rag.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        Ok(Self::default())
    }

    /// Reject values that make ranking undefined.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::RagError;

        if self.search.rrf_k == 0 {
            return Err(RagError::config("search.rrf_k must be positive"));
        }
        if self.search.oversample == 0 {
            return Err(RagError::config("search.oversample must be at least 1"));
        }
        if self.bm25.k1.is_nan() || self.bm25.k1 < 0.0 {
            return Err(RagError::config("bm25.k1 must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(RagError::config("bm25.b must be within [0, 1]"));
        }
        if self.rerank.candidate_multiplier == 0 {
            return Err(RagError::config("rerank.candidate_multiplier must be at least 1"));
        }
        if self.chunking.chunk_size == 0 {
            return Err(RagError::config("chunking.chunk_size must be positive"));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(RagError::config(
                "chunking.overlap must be smaller than chunking.chunk_size",
            ));
        }
        if self.chunking.sentences_per_chunk == 0 {
            return Err(RagError::config("chunking.sentences_per_chunk must be positive"));
        }
        Ok(())
    }
}
