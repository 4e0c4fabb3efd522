//! Retrieval-augmented answering.
//!
//! [`Pipeline`] is the single entry point shared by the HTTP API, the CLI
//! and the evaluation harness.

pub mod answer;
pub mod result;

pub use answer::{load_pipeline, Pipeline};
pub use result::{pack_result, AnswerResult};
