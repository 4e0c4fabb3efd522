//! Answer packaging.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Keys owned by [`AnswerResult`]; `extra` can never replace them.
const RESERVED_KEYS: [&str; 3] = ["answer", "sources", "latency"];

/// The answer returned to every caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Model answer, or the refusal text
    pub answer: String,

    /// Sorted, de-duplicated source file names
    pub sources: Vec<String>,

    /// Seconds, rounded to milliseconds
    pub latency: f64,

    /// Additional fields flattened into the serialized object
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// Normalize an answer, its sources and the elapsed time into one record.
pub fn pack_result(
    answer: impl Into<String>,
    sources: impl IntoIterator<Item = String>,
    latency_secs: f64,
    extra: Option<Map<String, Value>>,
) -> AnswerResult {
    let sources: Vec<String> = sources
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut extra = extra.unwrap_or_default();
    for key in RESERVED_KEYS {
        if extra.remove(key).is_some() {
            tracing::debug!("Ignoring extra field '{}' that shadows a result field", key);
        }
    }

    AnswerResult {
        answer: answer.into(),
        sources,
        latency: round_millis(latency_secs),
        extra,
    }
}

fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}
