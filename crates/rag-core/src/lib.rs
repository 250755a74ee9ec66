//! rag-core - Core types and traits for the hybrid retrieval engine
//!
//! This crate provides the foundational types, traits, configuration and
//! error handling shared by the chunking, indexing, judging and query crates.

pub mod config;
pub mod error;
pub mod text;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{JudgeError, RagError, Result};
pub use text::tokenize;
pub use traits::*;
pub use types::*;
