//! Error types for brandrag.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! language-model, embedding, index and ingestion failures.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for brandrag.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language-model invocation errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The index location is missing or malformed
    #[error("Index not found at {path:?}: {reason}")]
    IndexNotFound { path: PathBuf, reason: String },

    /// Query vectors and index vectors come from different embedding spaces
    #[error("Embedding dimension mismatch: index has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Ingestion found nothing to index
    #[error(
        "No readable documents found in {dir:?}. Put .md/.txt files or text-based PDFs there."
    )]
    NoDocuments { dir: PathBuf },

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_documents_message_names_directory() {
        let err = AppError::NoDocuments {
            dir: PathBuf::from("docs"),
        };
        let message = err.to_string();
        assert!(message.contains("\"docs\""));
        assert!(message.contains(".md/.txt"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = AppError::DimensionMismatch {
            expected: 384,
            actual: 1536,
        };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: index has 384, query has 1536"
        );
    }
}
