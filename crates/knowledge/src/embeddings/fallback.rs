//! Ordered embedding strategies with fallback.
//!
//! Each strategy embeds the complete input on its own. A failure anywhere in
//! the run discards that strategy's partial output and the next one starts
//! from scratch, so every vector in a result comes from a single model.

use super::provider::{EmbeddingProvider, FailureClass};
use brandrag_core::{AppError, AppResult, RagConfig};
use std::sync::Arc;

/// Vectors produced by the first strategy that succeeded.
#[derive(Debug)]
pub struct Embedded {
    pub provider: Arc<dyn EmbeddingProvider>,
    pub vectors: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// Result of one strategy attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Embedded),
    Failure {
        provider: String,
        class: FailureClass,
        reason: String,
    },
}

/// An ordered list of embedding strategies.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    strategies: Vec<Arc<dyn EmbeddingProvider>>,
    batch_size: usize,
}

impl FallbackChain {
    pub fn new(strategies: Vec<Arc<dyn EmbeddingProvider>>, batch_size: usize) -> Self {
        Self {
            strategies,
            batch_size: batch_size.max(1),
        }
    }

    /// Build the chain named by `embedding_providers`.
    pub fn from_config(config: &RagConfig) -> AppResult<Self> {
        let strategies = config
            .embedding_providers
            .iter()
            .map(|name| super::create_provider(name, None, config))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self::new(strategies, config.embedding_batch_size))
    }

    pub fn strategies(&self) -> &[Arc<dyn EmbeddingProvider>] {
        &self.strategies
    }

    /// Embed `texts` with the first strategy that completes.
    pub async fn embed_all(&self, texts: &[String]) -> AppResult<Embedded> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            tracing::info!(
                "Embedding {} texts with {} ({})",
                texts.len(),
                strategy.provider_name(),
                strategy.model_name()
            );

            match self.attempt(strategy, texts).await {
                AttemptOutcome::Success(embedded) => {
                    tracing::info!(
                        "Embedded {} texts with {} ({} dims)",
                        embedded.vectors.len(),
                        strategy.provider_name(),
                        embedded.dimensions
                    );
                    return Ok(embedded);
                }
                AttemptOutcome::Failure {
                    provider,
                    class,
                    reason,
                } => {
                    tracing::warn!(
                        provider = %provider,
                        class = %class,
                        "Embedding strategy failed, trying next: {}",
                        reason
                    );
                    failures.push(format!("{} ({}): {}", provider, class, reason));
                }
            }
        }

        Err(AppError::Embedding(format!(
            "All embedding strategies failed: {}",
            if failures.is_empty() {
                "none configured".to_string()
            } else {
                failures.join("; ")
            }
        )))
    }

    /// Run one strategy over every batch.
    pub async fn attempt(
        &self,
        strategy: &Arc<dyn EmbeddingProvider>,
        texts: &[String],
    ) -> AttemptOutcome {
        let failure = |class: FailureClass, reason: String| AttemptOutcome::Failure {
            provider: strategy.provider_name().to_string(),
            class,
            reason,
        };

        let mut vectors = Vec::with_capacity(texts.len());
        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            match strategy.embed_batch(batch).await {
                Ok(batch_vectors) if batch_vectors.len() == batch.len() => {
                    vectors.extend(batch_vectors);
                }
                Ok(batch_vectors) => {
                    return failure(
                        FailureClass::InvalidResponse,
                        format!(
                            "batch {} returned {} vectors for {} texts",
                            i,
                            batch_vectors.len(),
                            batch.len()
                        ),
                    );
                }
                Err(e) => return failure(e.class, e.message),
            }
            tracing::debug!("Embedded batch {} ({} texts)", i, batch.len());
        }

        let dimensions = vectors
            .first()
            .map(Vec::len)
            .or_else(|| strategy.dimensions())
            .unwrap_or(0);

        if dimensions == 0 && !texts.is_empty() {
            return failure(
                FailureClass::InvalidResponse,
                "provider returned empty vectors".to_string(),
            );
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return failure(
                FailureClass::InvalidResponse,
                format!("mixed dimensions: {} and {}", dimensions, bad.len()),
            );
        }
        if let Some(expected) = strategy.dimensions() {
            if expected != dimensions && !texts.is_empty() {
                return failure(
                    FailureClass::InvalidResponse,
                    format!("expected {} dimensions, got {}", expected, dimensions),
                );
            }
        }

        AttemptOutcome::Success(Embedded {
            provider: Arc::clone(strategy),
            vectors,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::provider::{EmbeddingError, EmbeddingResult};
    use crate::embeddings::providers::TrigramProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds for `ok_batches` batches, then fails with `class`.
    #[derive(Debug)]
    struct FlakyProvider {
        ok_batches: usize,
        class: FailureClass,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(ok_batches: usize, class: FailureClass) -> Self {
            Self {
                ok_batches,
                class,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for FlakyProvider {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        fn model_name(&self) -> &str {
            "flaky-v0"
        }

        fn dimensions(&self) -> Option<usize> {
            Some(8)
        }

        async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.ok_batches {
                return Err(EmbeddingError::new(self.class, "insufficient_quota"));
            }
            Ok(texts.iter().map(|_| vec![1.0; 8]).collect())
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("passage number {}", i)).collect()
    }

    #[tokio::test]
    async fn test_first_strategy_wins() {
        let chain = FallbackChain::new(vec![Arc::new(TrigramProvider::default())], 2);
        let embedded = chain.embed_all(&texts(5)).await.unwrap();

        assert_eq!(embedded.provider.provider_name(), "trigram");
        assert_eq!(embedded.vectors.len(), 5);
        assert_eq!(embedded.dimensions, 384);
    }

    #[tokio::test]
    async fn test_mid_run_failure_restarts_with_next_strategy() {
        let flaky = Arc::new(FlakyProvider::new(1, FailureClass::Quota));
        let strategies: Vec<Arc<dyn EmbeddingProvider>> =
            vec![flaky.clone(), Arc::new(TrigramProvider::default())];
        let chain = FallbackChain::new(strategies, 2);

        let embedded = chain.embed_all(&texts(5)).await.unwrap();

        // One good batch, one failed batch, then trigram embeds everything
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
        assert_eq!(embedded.provider.provider_name(), "trigram");
        assert_eq!(embedded.vectors.len(), 5);
        assert!(embedded.vectors.iter().all(|v| v.len() == 384));
    }

    #[tokio::test]
    async fn test_attempt_reports_failure_class() {
        let chain = FallbackChain::new(vec![], 10);
        let strategy: Arc<dyn EmbeddingProvider> =
            Arc::new(FlakyProvider::new(0, FailureClass::Auth));

        match chain.attempt(&strategy, &texts(3)).await {
            AttemptOutcome::Failure {
                provider, class, ..
            } => {
                assert_eq!(provider, "flaky");
                assert_eq!(class, FailureClass::Auth);
            }
            AttemptOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_all_strategies_failing_is_fatal() {
        let strategies: Vec<Arc<dyn EmbeddingProvider>> = vec![
            Arc::new(FlakyProvider::new(0, FailureClass::Quota)),
            Arc::new(FlakyProvider::new(0, FailureClass::Network)),
        ];
        let chain = FallbackChain::new(strategies, 10);

        let err = chain.embed_all(&texts(3)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("All embedding strategies failed"));
        assert!(message.contains("quota"));
        assert!(message.contains("network"));
    }

    #[test]
    fn test_from_config_keeps_order() {
        let config = RagConfig {
            embedding_providers: vec!["trigram".into(), "openai".into()],
            ..Default::default()
        };
        let chain = FallbackChain::from_config(&config).unwrap();
        let names: Vec<&str> = chain
            .strategies()
            .iter()
            .map(|s| s.provider_name())
            .collect();
        assert_eq!(names, vec!["trigram", "openai"]);
    }

    #[test]
    fn test_default_chain_tries_local_model_before_trigram() {
        let chain = FallbackChain::from_config(&RagConfig::default()).unwrap();
        let names: Vec<(&str, &str)> = chain
            .strategies()
            .iter()
            .map(|s| (s.provider_name(), s.model_name()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("openai", "text-embedding-3-small"),
                ("ollama", "nomic-embed-text"),
                ("trigram", "trigram-v1"),
            ]
        );
    }
}
