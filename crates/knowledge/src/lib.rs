//! Document ingestion, vector index and grounded answering for brandrag.
//!
//! Offline, [`ingest::build_index`] turns a folder of brand documents into an
//! on-disk index. Online, [`rag::load_pipeline`] opens that index and
//! [`rag::Pipeline::ask`] answers questions from it.

pub mod chunker;
pub mod embeddings;
pub mod eval;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod rag;
pub mod types;

#[cfg(test)]
mod tests;

pub use eval::{load_cases, run_eval, EvalCase, EvalOutcome, EvalReport, Expectation};
pub use index::{EmbeddingManifest, IndexHandle};
pub use ingest::{build_index, build_index_with};
pub use loader::load_documents;
pub use rag::{load_pipeline, pack_result, AnswerResult, Pipeline};
pub use types::{Chunk, Document, IngestStats};
