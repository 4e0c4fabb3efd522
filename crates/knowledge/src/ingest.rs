//! Offline index build: load, chunk, embed, persist.

use crate::chunker::chunk_document;
use crate::embeddings::FallbackChain;
use crate::index::{self, EmbeddingManifest, IndexRecord};
use crate::loader::load_documents;
use crate::types::{Chunk, IngestStats};
use brandrag_core::{AppError, AppResult, RagConfig};
use chrono::Utc;
use std::path::Path;
use std::time::Instant;

/// Build the index in `config.index_dir` from the documents in `docs_dir`,
/// using the configured embedding strategies.
pub async fn build_index(docs_dir: &Path, config: &RagConfig) -> AppResult<IngestStats> {
    let chain = FallbackChain::from_config(config)?;
    build_index_with(docs_dir, config, &chain).await
}

/// Build the index with an explicit strategy chain.
///
/// Nothing is written unless every chunk was embedded by one strategy.
pub async fn build_index_with(
    docs_dir: &Path,
    config: &RagConfig,
    chain: &FallbackChain,
) -> AppResult<IngestStats> {
    let start = Instant::now();
    config.validate()?;

    tracing::info!("Starting ingest from {:?}", docs_dir);

    let documents = load_documents(docs_dir)?;
    if documents.is_empty() {
        return Err(AppError::NoDocuments {
            dir: docs_dir.to_path_buf(),
        });
    }

    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunk_document(doc, config.chunk_size, config.chunk_overlap))
        .collect();

    tracing::info!(
        "Chunked {} documents into {} chunks (size {}, overlap {})",
        documents.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embedded = chain.embed_all(&texts).await?;

    let manifest = EmbeddingManifest {
        provider: embedded.provider.provider_name().to_string(),
        model: embedded.provider.model_name().to_string(),
        dimensions: embedded.dimensions,
        chunk_count: chunks.len(),
        built_at: Utc::now(),
    };

    let records: Vec<IndexRecord> = chunks
        .into_iter()
        .zip(embedded.vectors)
        .map(|(chunk, vector)| IndexRecord { vector, chunk })
        .collect();

    index::build(&config.index_dir, &manifest, &records)?;

    let duration = start.elapsed();

    tracing::info!(
        "Ingest completed: {} documents, {} chunks with {} ({}) in {:.2}s",
        documents.len(),
        records.len(),
        manifest.provider,
        manifest.model,
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        documents: documents.len(),
        chunks: records.len(),
        provider: manifest.provider,
        model: manifest.model,
        dimensions: manifest.dimensions,
        duration_secs: duration.as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::embeddings::{EmbeddingError, EmbeddingProvider, EmbeddingResult, FailureClass};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct QuotaExhausted;

    #[async_trait::async_trait]
    impl EmbeddingProvider for QuotaExhausted {
        fn provider_name(&self) -> &str {
            "openai"
        }

        fn model_name(&self) -> &str {
            "text-embedding-3-small"
        }

        fn dimensions(&self) -> Option<usize> {
            Some(1536)
        }

        async fn embed_batch(&self, _texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::new(
                FailureClass::Quota,
                "You exceeded your current quota",
            ))
        }
    }

    fn write_docs(dir: &Path) {
        fs::write(
            dir.join("voice.md"),
            "# Voice\n\nOur tone is playful and warm. We never use sarcasm.\n".repeat(8),
        )
        .unwrap();
        fs::write(dir.join("faq.txt"), "Orders ship within two business days.").unwrap();
        fs::write(dir.join("logo.png"), [137u8, 80, 78, 71]).unwrap();
    }

    fn config_for(temp: &TempDir) -> RagConfig {
        RagConfig {
            index_dir: temp.path().join("index"),
            chunk_size: 120,
            chunk_overlap: 30,
            embedding_providers: vec!["trigram".to_string()],
            ..Default::default()
        }
    }

    fn trigram_only() -> FallbackChain {
        FallbackChain::new(vec![Arc::new(TrigramProvider::default())], 100)
    }

    #[tokio::test]
    async fn test_build_index_with_trigram() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir(&docs).unwrap();
        write_docs(&docs);
        let config = config_for(&temp);

        let stats = build_index(&docs, &config).await.unwrap();

        assert_eq!(stats.documents, 2);
        assert!(stats.chunks > 2);
        assert_eq!(stats.provider, "trigram");
        assert_eq!(stats.model, "trigram-v1");
        assert_eq!(stats.dimensions, 384);

        let handle = index::load(&config.index_dir).unwrap();
        assert_eq!(handle.len(), stats.chunks);
        assert_eq!(handle.manifest().chunk_count, stats.chunks);
    }

    #[tokio::test]
    async fn test_no_documents_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("notes.docx"), "ignored").unwrap();
        let config = config_for(&temp);

        let err = build_index_with(&docs, &config, &trigram_only())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoDocuments { .. }));
        assert!(err.to_string().contains(".md/.txt"));
        assert!(!config.index_dir.exists());
    }

    #[tokio::test]
    async fn test_fallback_index_matches_direct_build() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir(&docs).unwrap();
        write_docs(&docs);

        let direct_config = config_for(&temp);
        let direct = build_index_with(&docs, &direct_config, &trigram_only())
            .await
            .unwrap();

        let fallback_config = RagConfig {
            index_dir: temp.path().join("fallback-index"),
            ..config_for(&temp)
        };
        let strategies: Vec<Arc<dyn EmbeddingProvider>> = vec![
            Arc::new(QuotaExhausted),
            Arc::new(TrigramProvider::default()),
        ];
        let chain = FallbackChain::new(strategies, 4);
        let fallback = build_index_with(&docs, &fallback_config, &chain)
            .await
            .unwrap();

        assert_eq!(fallback.provider, "trigram");
        assert_eq!(fallback.chunks, direct.chunks);
        assert_eq!(fallback.dimensions, direct.dimensions);

        let a = index::load(&direct_config.index_dir).unwrap();
        let b = index::load(&fallback_config.index_dir).unwrap();
        assert_eq!(a.len(), b.len());
        assert_eq!(a.manifest().dimensions, b.manifest().dimensions);
    }

    #[tokio::test]
    async fn test_all_strategies_failing_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir(&docs).unwrap();
        write_docs(&docs);
        let config = config_for(&temp);

        let chain = FallbackChain::new(vec![Arc::new(QuotaExhausted)], 10);
        let err = build_index_with(&docs, &config, &chain).await.unwrap_err();

        assert!(matches!(err, AppError::Embedding(_)));
        assert!(!index::index_path(&config.index_dir).exists());
    }

    #[tokio::test]
    async fn test_rebuild_replaces_index() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir(&docs).unwrap();
        write_docs(&docs);
        let config = config_for(&temp);

        build_index_with(&docs, &config, &trigram_only())
            .await
            .unwrap();
        fs::remove_file(docs.join("voice.md")).unwrap();
        let stats = build_index_with(&docs, &config, &trigram_only())
            .await
            .unwrap();

        assert_eq!(stats.documents, 1);
        assert_eq!(index::load(&config.index_dir).unwrap().len(), 1);
    }
}
