//! Grounded prompt rendering for brandrag.
//!
//! This crate owns the instructions sent to the model:
//! - the built-in grounded answer template
//! - Handlebars rendering of context, question and refusal text
//! - optional template overrides loaded from disk

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::load_template;
pub use types::{BuiltPrompt, PromptTemplate, PromptVars, SYSTEM_INSTRUCTION};
