//! Grounded answering over a loaded index.
//!
//! Retrieves the nearest chunks, refuses without calling the model when the
//! retrieved context is too thin, otherwise asks the model to answer from
//! that context only.

use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::index::{self, IndexHandle};
use crate::rag::result::{pack_result, AnswerResult};
use brandrag_core::{AppError, AppResult, RagConfig};
use brandrag_llm::{create_client, LlmClient, LlmRequest};
use brandrag_prompt::{build_prompt, load_template, PromptTemplate, PromptVars};
use std::sync::Arc;
use std::time::Instant;

/// Everything needed to answer questions. Immutable; share it behind an `Arc`.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<RagConfig>,
    index: Arc<IndexHandle>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("index_dir", &self.config.index_dir)
            .field("chunks", &self.index.len())
            .field("embedder", &self.embedder.provider_name())
            .field("llm", &self.llm.provider_name())
            .field("template", &self.template.name)
            .finish()
    }
}

/// Load the index and build a pipeline.
///
/// The query embedder is rebuilt from the index manifest so questions are
/// embedded in the same space as the stored chunks, whatever the config says.
pub async fn load_pipeline(config: Arc<RagConfig>) -> AppResult<Pipeline> {
    tracing::info!("Loading index from {:?}", config.index_dir);

    let index = index::load(&config.index_dir)?;
    let manifest = index.manifest().clone();

    let embedder = create_provider(&manifest.provider, Some(&manifest.model), &config)?;
    check_embedder_dimensions(embedder.as_ref(), manifest.dimensions).await?;

    if manifest.provider == "openai" && manifest.model != config.embedding_model {
        tracing::warn!(
            "Index was built with {} but config names {}; querying with {}",
            manifest.model,
            config.embedding_model,
            manifest.model
        );
    } else if manifest.provider != "openai" {
        tracing::info!(
            "Index was built with {} ({}); queries use the same provider",
            manifest.provider,
            manifest.model
        );
    }

    let llm = create_client("ollama", Some(&config.ollama_url))?;

    let template = match &config.prompt_template {
        Some(path) => load_template(path)?,
        None => PromptTemplate::grounded(),
    };

    tracing::info!(
        "Pipeline ready: {} chunks, model {}, top_k {}",
        index.len(),
        config.ollama_model,
        config.top_k
    );

    Ok(Pipeline::from_parts(
        config,
        Arc::new(index),
        embedder,
        llm,
        template,
    ))
}

/// Fail early when the query embedder cannot produce index-sized vectors.
///
/// Models without a known dimension are asked for one sample embedding.
async fn check_embedder_dimensions(
    embedder: &dyn EmbeddingProvider,
    expected: usize,
) -> AppResult<()> {
    let actual = match embedder.dimensions() {
        Some(dims) => dims,
        None => {
            tracing::debug!(
                "{} ({}) has no known dimension, embedding a sample",
                embedder.provider_name(),
                embedder.model_name()
            );
            embedder.embed("dimension check").await?.len()
        }
    };

    if actual != expected {
        return Err(AppError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

impl Pipeline {
    /// Assemble a pipeline from already-built parts.
    pub fn from_parts(
        config: Arc<RagConfig>,
        index: Arc<IndexHandle>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            config,
            index,
            embedder,
            llm,
            template,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// Answer a question from the indexed documents.
    ///
    /// Returns the refusal text without calling the model when the
    /// retrieved context is shorter than `min_context_chars`. Model errors
    /// are returned as-is; nothing is retried.
    pub async fn ask(&self, question: &str) -> AppResult<AnswerResult> {
        let started = Instant::now();
        tracing::info!("Answering: {}", question);

        let query = self.embedder.embed(question).await?;
        let hits = self.index.search(&query, self.config.top_k)?;

        let context = hits
            .iter()
            .map(|(chunk, _)| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sources: Vec<String> = hits.iter().map(|(chunk, _)| chunk.source.clone()).collect();

        let context_chars = context.chars().count();
        tracing::debug!(
            "Retrieved {} chunks, {} context chars, sources {:?}",
            hits.len(),
            context_chars,
            sources
        );

        if context_chars < self.config.min_context_chars {
            tracing::info!(
                "Context too short ({} < {}), refusing",
                context_chars,
                self.config.min_context_chars
            );
            return Ok(pack_result(
                self.config.refusal_text.clone(),
                sources,
                started.elapsed().as_secs_f64(),
                None,
            ));
        }

        let prompt = build_prompt(
            &self.template,
            &PromptVars {
                context: &context,
                question,
                refusal_text: &self.config.refusal_text,
            },
        )?;

        let mut request = LlmRequest::new(prompt.user, self.config.ollama_model.clone())
            .with_system(prompt.system)
            .with_temperature(self.config.temperature);
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.llm.complete(&request).await?;

        let result = pack_result(
            response.text(),
            sources,
            started.elapsed().as_secs_f64(),
            None,
        );
        tracing::info!(
            "Answered in {:.3}s from {} sources",
            result.latency,
            result.sources.len()
        );
        Ok(result)
    }
}
