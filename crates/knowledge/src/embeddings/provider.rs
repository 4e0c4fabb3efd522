//! Embedding provider trait, failure classes and factory.

use super::providers::{OllamaProvider, OpenAiProvider, TrigramProvider};
use brandrag_core::{AppError, AppResult, RagConfig};
use std::fmt;
use std::sync::Arc;

/// Why an embedding call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rate limit or exhausted quota
    Quota,
    /// Missing or rejected credentials
    Auth,
    /// Connection, DNS or timeout failures
    Network,
    /// The provider answered with something unusable
    InvalidResponse,
    Other,
}

impl FailureClass {
    /// Classify an HTTP error status.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::Quota,
            401 | 403 => Self::Auth,
            _ => Self::Other,
        }
    }

    /// Classify a transport-level reqwest error.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16())
        } else {
            Self::Network
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::Auth => "auth",
            Self::Network => "network",
            Self::InvalidResponse => "invalid-response",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified embedding failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{class} failure: {message}")]
pub struct EmbeddingError {
    pub class: FailureClass,
    pub message: String,
}

impl EmbeddingError {
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FailureClass::InvalidResponse, message)
    }
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        AppError::Embedding(err.to_string())
    }
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name as written in config and the index manifest
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Vector dimension, when known before the first call
    fn dimensions(&self) -> Option<usize>;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| EmbeddingError::invalid_response("No embedding returned"))
    }
}

/// Create an embedding provider by name.
///
/// `model` pins the model (as recorded in an index manifest); when `None`
/// the configured model for that provider is used.
pub fn create_provider(
    name: &str,
    model: Option<&str>,
    config: &RagConfig,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match name {
        "openai" => Ok(Arc::new(OpenAiProvider::new(
            &config.openai_base_url,
            model.unwrap_or(&config.embedding_model),
            config.resolve_openai_key(),
        ))),

        "ollama" => Ok(Arc::new(OllamaProvider::new(
            &config.ollama_url,
            model.unwrap_or(&config.ollama_embedding_model),
        ))),

        "trigram" => match model {
            Some(m) if m != TrigramProvider::MODEL => Err(AppError::Config(format!(
                "Unknown trigram model '{}'. Supported: {}",
                m,
                TrigramProvider::MODEL
            ))),
            _ => Ok(Arc::new(TrigramProvider::default())),
        },

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, trigram",
            name
        ))),
    }
}
