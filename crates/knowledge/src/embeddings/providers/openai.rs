//! OpenAI embeddings provider.
//!
//! Calls `POST {base_url}/embeddings` with the whole batch as `input`.
//! Any OpenAI-compatible endpoint works if it returns the same shape.

use crate::embeddings::provider::{
    EmbeddingError, EmbeddingProvider, EmbeddingResult, FailureClass,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Dimensions of the published OpenAI embedding models.
pub fn known_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider. A missing key is reported on first use as an auth failure.
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Turn a success body into vectors ordered like the input.
    fn parse_response(&self, body: Value, expected: usize) -> EmbeddingResult<Vec<Vec<f32>>> {
        let response: EmbeddingResponse = serde_json::from_value(body).map_err(|e| {
            EmbeddingError::invalid_response(format!("Unexpected OpenAI response: {}", e))
        })?;

        let mut data = response.data;
        if data.len() != expected {
            return Err(EmbeddingError::invalid_response(format!(
                "OpenAI returned {} embeddings for {} inputs",
                data.len(),
                expected
            )));
        }
        data.sort_by_key(|d| d.index);

        let embeddings: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();
        if let Some(dims) = self.dimensions() {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != dims) {
                return Err(EmbeddingError::invalid_response(format!(
                    "Unexpected embedding dimensions: got {}, expected {}",
                    bad.len(),
                    dims
                )));
            }
        }

        Ok(embeddings)
    }
}

/// Classify a non-success response from its status and error body.
fn classify_error(status: u16, body: &str) -> EmbeddingError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let code = error
        .and_then(|e| e.get("code").or_else(|| e.get("type")))
        .and_then(|c| c.as_str());
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or(body);

    let class = match code {
        Some("insufficient_quota") => FailureClass::Quota,
        Some("invalid_api_key") => FailureClass::Auth,
        _ => FailureClass::from_status(status),
    };

    EmbeddingError::new(class, format!("OpenAI API error ({}): {}", status, message))
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        known_dimensions(&self.model)
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "openai", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            EmbeddingError::new(FailureClass::Auth, "OpenAI API key is not set")
        })?;

        let url = format!("{}/embeddings", self.base_url);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                EmbeddingError::new(
                    FailureClass::from_reqwest(&e),
                    format!("Failed to call OpenAI API: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        let body: Value = response.json().await.map_err(|e| {
            EmbeddingError::invalid_response(format!("Failed to parse OpenAI response: {}", e))
        })?;

        self.parse_response(body, texts.len())
    }
}
