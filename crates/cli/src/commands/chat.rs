//! Chat command handler.
//!
//! Interactive loop over stdin; `q`, `quit` or `exit` leaves.

use super::ask::print_answer;
use brandrag_core::{AppResult, RagConfig};
use brandrag_knowledge::load_pipeline;
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

/// Interactive question loop
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, config: RagConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let pipeline = load_pipeline(Arc::new(config)).await?;
        println!("brandrag ready. Type your question (or 'q' to quit).");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("\nQ: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();
            if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
                break;
            }
            if question.is_empty() {
                continue;
            }

            // A failed question is reported and the loop continues
            match pipeline.ask(question).await {
                Ok(result) => print_answer(&result),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Ok(())
    }
}
