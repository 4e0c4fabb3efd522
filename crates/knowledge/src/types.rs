//! Knowledge type definitions.

use serde::{Deserialize, Serialize};

/// A loaded source document: file name plus whitespace-collapsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name (no directory), used as the citation key
    pub filename: String,

    /// Cleaned text
    pub text: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// A retrievable passage tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed, non-empty passage text
    pub content: String,

    /// Source file name
    pub source: String,
}

/// Report returned by an index build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Documents that produced text
    pub documents: usize,

    /// Chunks written to the index
    pub chunks: usize,

    /// Embedding provider that succeeded
    pub provider: String,

    /// Embedding model that succeeded
    pub model: String,

    /// Vector dimension
    pub dimensions: usize,

    /// Wall time of the whole build
    pub duration_secs: f64,
}
