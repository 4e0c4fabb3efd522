//! Configuration management for brandrag.
//!
//! Configuration is loaded once from a YAML file (default `config.yaml` in the
//! working directory), then adjusted by environment variables and CLI flags.
//! After loading it is immutable: every pipeline holds an `Arc<RagConfig>`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Pipeline configuration.
///
/// Every key is optional in the file; missing keys take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Directory holding the persisted vector index
    pub index_dir: PathBuf,

    /// Directory scanned by `ingest`
    pub docs_dir: PathBuf,

    /// Ollama chat model used for answering
    pub ollama_model: String,

    /// Sampling temperature for the chat model
    pub temperature: f32,

    /// Cap on generated answer tokens; unset leaves the model default
    pub max_tokens: Option<u32>,

    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Below this many characters of context the model is never called
    pub min_context_chars: usize,

    /// Answer returned when the documents do not cover the question
    pub refusal_text: String,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Remote (OpenAI) embedding model
    pub embedding_model: String,

    /// Embedding strategies tried in order at ingest time
    pub embedding_providers: Vec<String>,

    /// Texts per embedding request
    pub embedding_batch_size: usize,

    /// Base URL of the Ollama server
    pub ollama_url: String,

    /// Ollama embedding model, used when `ollama` is in `embedding_providers`
    pub ollama_embedding_model: String,

    /// Base URL of the OpenAI-compatible embeddings API
    pub openai_base_url: String,

    /// Environment variable holding the OpenAI API key
    pub openai_api_key_env: String,

    /// Optional Handlebars template replacing the built-in grounded prompt
    pub prompt_template: Option<PathBuf>,

    /// Listen address for `serve`
    pub server_addr: String,

    /// JSONL file read by `eval`
    pub eval_file: PathBuf,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "brandrag_knowledge=debug")
    pub level: Option<String>,

    /// Colored output; `false` disables ANSI colors
    pub color: Option<bool>,

    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("faiss_index"),
            docs_dir: PathBuf::from("docs"),
            ollama_model: "llama3".to_string(),
            temperature: 0.0,
            max_tokens: None,
            top_k: 4,
            min_context_chars: 200,
            refusal_text: "Not enough info in the docs.".to_string(),
            chunk_size: 800,
            chunk_overlap: 150,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_providers: vec![
                "openai".to_string(),
                "ollama".to_string(),
                "trigram".to_string(),
            ],
            embedding_batch_size: 100,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_embedding_model: "nomic-embed-text".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_api_key_env: "OPENAI_API_KEY".to_string(),
            prompt_template: None,
            server_addr: "127.0.0.1:8000".to_string(),
            eval_file: PathBuf::from("eval/qa.jsonl"),
            logging: LoggingConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a YAML file plus environment overrides.
    ///
    /// The file is resolved from, in order: the explicit `path`, the
    /// `BRANDRAG_CONFIG` environment variable, `config.yaml`. A missing or
    /// unparsable file is an error: the pipeline must not start on guesses.
    ///
    /// Environment variables:
    /// - `BRANDRAG_CONFIG`: Path to config file
    /// - `BRANDRAG_INDEX_DIR`: Override `index_dir`
    /// - `BRANDRAG_MODEL`: Override `ollama_model`
    /// - `OLLAMA_URL`: Override `ollama_url`
    ///
    /// # Example
    /// ```no_run
    /// use brandrag_core::config::RagConfig;
    ///
    /// let config = RagConfig::load(None).expect("Failed to load config");
    /// println!("Index: {:?}", config.index_dir);
    /// ```
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("BRANDRAG_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let mut config = Self::from_file(&config_path)?;
        config.apply_env();
        config.validate()?;

        tracing::debug!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Parse a config file without environment overrides.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::Config(format!(
                "Config file {:?} not found. Create it in the project root or pass --config.",
                path
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> AppResult<Self> {
        // An empty file deserializes to `null`, which means "all defaults".
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    fn apply_env(&mut self) {
        if let Ok(index_dir) = std::env::var("BRANDRAG_INDEX_DIR") {
            self.index_dir = PathBuf::from(index_dir);
        }

        if let Ok(model) = std::env::var("BRANDRAG_MODEL") {
            self.ollama_model = model;
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.ollama_url = url;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over both the file and the environment.
    pub fn with_overrides(
        mut self,
        index_dir: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(index_dir) = index_dir {
            self.index_dir = index_dir;
        }

        if let Some(model) = model {
            self.ollama_model = model;
        }

        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        // Verbose mode implies debug logging
        if verbose && self.logging.level.is_none() {
            self.logging.level = Some("debug".to_string());
        }

        if no_color {
            self.logging.color = Some(false);
        }

        self
    }

    /// Whether ANSI colors are disabled.
    pub fn no_color(&self) -> bool {
        self.logging.color == Some(false)
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be within 0.0-2.0, got {}",
                self.temperature
            )));
        }

        if self.embedding_providers.is_empty() {
            return Err(AppError::Config(
                "embedding_providers must name at least one provider".to_string(),
            ));
        }

        if self.embedding_batch_size == 0 {
            return Err(AppError::Config(
                "embedding_batch_size must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the OpenAI API key from the configured environment variable.
    pub fn resolve_openai_key(&self) -> Option<String> {
        std::env::var(&self.openai_api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
