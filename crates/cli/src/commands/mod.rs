//! Command handlers for the brandrag CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod eval;
pub mod ingest;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use eval::EvalCommand;
pub use ingest::IngestCommand;
pub use serve::ServeCommand;
