//! Request handlers.

use crate::server::{AppContext, PipelineInit};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Serve the question form.
pub async fn form_page() -> Html<&'static str> {
    Html(super::page::FORM_HTML)
}

/// Health probe; stays live when the pipeline failed to load.
pub async fn healthz(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    match ctx.init.error_tail() {
        None => Json(json!({"status": "ok"})),
        Some(tail) => Json(json!({"status": "degraded", "error": tail})),
    }
}

pub async fn ask_usage() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"detail": r#"Use POST /ask with JSON body: {"question": "..."}"#})),
    )
        .into_response()
}

/// Answer one question.
pub async fn ask(State(ctx): State<Arc<AppContext>>, Json(req): Json<AskRequest>) -> Response {
    let pipeline = match &ctx.init {
        PipelineInit::Ready(pipeline) => pipeline.clone(),
        PipelineInit::Failed { .. } => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "detail": "Model pipeline not initialized.",
                    "hint": "Check server logs.",
                    "error_tail": ctx.init.error_tail().unwrap_or(""),
                })),
            )
                .into_response();
        }
    };

    let question = req.question.trim();
    if question.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "question must not be empty"})),
        )
            .into_response();
    }

    match pipeline.ask(question).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!("Ask failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": e.to_string()})),
            )
                .into_response()
        }
    }
}
