//! Ingest command handler.
//!
//! Builds the on-disk index from the documents folder.

use brandrag_core::{AppResult, RagConfig};
use clap::Args;
use std::path::PathBuf;

/// Build the index from the documents folder
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Documents folder (default: docs_dir from config)
    #[arg(short, long)]
    pub docs: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &RagConfig) -> AppResult<()> {
        let docs_dir = self.docs.clone().unwrap_or_else(|| config.docs_dir.clone());
        tracing::info!("Executing ingest command for {:?}", docs_dir);

        let stats = brandrag_knowledge::build_index(&docs_dir, config).await?;

        if self.json {
            let output = serde_json::json!({
                "indexDir": config.index_dir,
                "documents": stats.documents,
                "chunks": stats.chunks,
                "provider": stats.provider,
                "model": stats.model,
                "dimensions": stats.dimensions,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} documents ({} chunks) with {} ({}, {} dims) into {} in {:.2}s",
                stats.documents,
                stats.chunks,
                stats.provider,
                stats.model,
                stats.dimensions,
                config.index_dir.display(),
                stats.duration_secs
            );
        }

        Ok(())
    }
}
