//! Error types for the retrieval engine.

use thiserror::Error;

/// Result type alias using RagError.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors that can occur in the retrieval engine.
#[derive(Error, Debug)]
pub enum RagError {
    /// Vector dimensionality does not match the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Embedding provider error.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Chunking error.
    #[error("Chunking error: {message}")]
    Chunking { message: String },

    /// Judging model error.
    #[error("Judge error: {0}")]
    Judge(#[from] JudgeError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RagError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a chunking error.
    pub fn chunking(message: impl Into<String>) -> Self {
        Self::Chunking {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Embedding { .. } => "EMBEDDING_ERROR",
            Self::Chunking { .. } => "CHUNKING_ERROR",
            Self::Judge(_) => "JUDGE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Failures of a call to the external relevance-judging model.
///
/// Re-ranking and contextual augmentation recover from all of these locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JudgeError {
    /// No judging model was configured.
    #[error("no judging model configured")]
    NotConfigured,

    /// The call did not complete in time.
    #[error("judging model timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status from the model API.
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The model returned no usable text.
    #[error("empty response")]
    EmptyResponse,

    /// The response could not be parsed into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response referenced a candidate that was never offered.
    #[error("unknown identifier in response: {0}")]
    UnknownIdentifier(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::dimension_mismatch(3, 4);
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RagError::dimension_mismatch(1, 2).error_code(),
            "DIMENSION_MISMATCH"
        );
        assert_eq!(RagError::config("bad").error_code(), "CONFIG_ERROR");
        assert_eq!(
            RagError::from(JudgeError::EmptyResponse).error_code(),
            "JUDGE_ERROR"
        );
    }

    #[test]
    fn test_judge_error_display() {
        let err = JudgeError::Timeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "judging model timed out after 250ms");
    }
}
