//! Ask command handler.
//!
//! Answers a single question from the index.

use brandrag_core::{AppResult, RagConfig};
use brandrag_knowledge::{load_pipeline, AnswerResult};
use clap::Args;
use std::sync::Arc;

/// Ask one question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: RagConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let pipeline = load_pipeline(Arc::new(config)).await?;
        let result = pipeline.ask(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_answer(&result);
        }

        Ok(())
    }
}

/// Human-readable answer block shared with `chat`.
pub fn print_answer(result: &AnswerResult) {
    println!("\nAnswer:\n{}\n", result.answer);
    println!(
        "Sources: {} | Latency: {}s",
        result.sources.join(", "),
        result.latency
    );
}
