//! Brandrag Core Library
//!
//! This crate provides the foundational utilities shared by every brandrag crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration loading (`RagConfig`)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::RagConfig;
pub use error::{AppError, AppResult};
