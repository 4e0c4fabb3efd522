//! Eval command handler.
//!
//! Asks every case in a JSONL file and prints a pass/fail score.

use brandrag_core::{AppResult, RagConfig};
use brandrag_knowledge::{load_cases, load_pipeline, run_eval};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Score the pipeline against an evaluation file
#[derive(Args, Debug)]
pub struct EvalCommand {
    /// JSONL file of {"q", "ref"} cases (default: eval_file from config)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl EvalCommand {
    pub async fn execute(&self, config: RagConfig) -> AppResult<()> {
        let file = self.file.clone().unwrap_or_else(|| config.eval_file.clone());
        tracing::info!("Executing eval command with {:?}", file);

        let cases = load_cases(&file)?;
        let pipeline = load_pipeline(Arc::new(config)).await?;
        let report = run_eval(&pipeline, &cases).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        for outcome in &report.outcomes {
            println!("Q: {}", outcome.question);
            match &outcome.error {
                Some(error) => println!("A: <error: {}>", error),
                None => println!("A: {}", outcome.answer),
            }
            println!(
                "PASS: {} | Lat: {}s | Src: {:?}\n---",
                outcome.passed, outcome.latency, outcome.sources
            );
        }
        println!("Score: {}/{}", report.passed, report.total);

        Ok(())
    }
}
