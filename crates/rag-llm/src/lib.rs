//! rag-llm - Relevance-judging model clients
//!
//! The retrieval engine consumes a judging model through the
//! [`Judge`](rag_core::Judge) trait for re-ranking and contextual
//! augmentation. This crate provides:
//!
//! - [`AnthropicJudge`]: a client for the Anthropic Messages API.
//! - [`MockJudge`]: a scripted judge for tests and offline runs.

mod anthropic;
mod mock;

pub use anthropic::AnthropicJudge;
pub use mock::MockJudge;

// Re-export the Judge trait for convenience
pub use rag_core::{Judge, JudgeError};
