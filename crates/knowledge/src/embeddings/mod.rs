//! Embedding providers and the ingest-time fallback chain.
//!
//! Providers are interchangeable behind [`EmbeddingProvider`]. Ingest tries
//! them in configured order through [`FallbackChain`]; queries rebuild the
//! provider recorded in the index manifest with [`create_provider`].

pub mod fallback;
pub mod provider;
pub mod providers;

pub use fallback::{AttemptOutcome, Embedded, FallbackChain};
pub use provider::{
    create_provider, EmbeddingError, EmbeddingProvider, EmbeddingResult, FailureClass,
};
