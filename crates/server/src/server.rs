//! HTTP server implementation using Axum.

use axum::{
    routing::{get, post},
    Router,
};
use brandrag_core::{AppResult, RagConfig};
use brandrag_knowledge::{load_pipeline, Pipeline};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Outcome of building the pipeline at startup.
#[derive(Debug, Clone)]
pub enum PipelineInit {
    Ready(Arc<Pipeline>),
    /// The server stays up, but `/ask` answers 503 with this diagnostic.
    Failed { diagnostic: String },
}

impl PipelineInit {
    /// Load the pipeline, capturing any failure instead of aborting.
    pub async fn initialize(config: AppResult<RagConfig>) -> Self {
        let loaded = match config {
            Ok(config) => load_pipeline(Arc::new(config)).await,
            Err(e) => Err(e),
        };
        match loaded {
            Ok(pipeline) => {
                tracing::info!("Pipeline initialized");
                Self::Ready(Arc::new(pipeline))
            }
            Err(e) => {
                let diagnostic = format!("{:?}\n{}", e, e);
                tracing::error!("Pipeline initialization failed: {}", e);
                Self::Failed { diagnostic }
            }
        }
    }

    /// Last line of the failure diagnostic, if any.
    pub fn error_tail(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed { diagnostic } => Some(diagnostic.lines().last().unwrap_or("")),
        }
    }
}

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub init: PipelineInit,
}

impl AppContext {
    pub fn new(init: PipelineInit) -> Self {
        Self { init }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(context: AppContext) -> Router {
    Router::new()
        .route("/", get(super::routes::form_page))
        .route("/healthz", get(super::routes::healthz))
        .route(
            "/ask",
            post(super::routes::ask).get(super::routes::ask_usage),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(context))
}

/// Start the HTTP server and run until the process is stopped.
pub async fn serve(addr: &str, init: PipelineInit) -> anyhow::Result<()> {
    if let Some(tail) = init.error_tail() {
        tracing::warn!("Starting in degraded mode: {}", tail);
    }

    let app = build_router(AppContext::new(init));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
