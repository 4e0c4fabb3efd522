//! brandrag CLI
//!
//! Main entry point for the brandrag command-line tool.
//! Builds the document index and answers brand questions from it.

mod commands;

use brandrag_core::{logging, AppResult, RagConfig};
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, EvalCommand, IngestCommand, ServeCommand};
use std::path::PathBuf;

/// brandrag - grounded answers from your brand documents
#[derive(Parser, Debug)]
#[command(name = "brandrag")]
#[command(about = "Grounded answers from your brand documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: config.yaml)
    #[arg(short, long, global = true, env = "BRANDRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Index directory
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Ollama model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the index from the documents folder
    Ingest(IngestCommand),

    /// Ask one question
    Ask(AskCommand),

    /// Interactive question loop
    Chat(ChatCommand),

    /// Run the HTTP API and web form
    Serve(ServeCommand),

    /// Score the pipeline against an evaluation file
    Eval(EvalCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration and apply CLI overrides
    let config = RagConfig::load(cli.config.as_deref()).map(|config| {
        config.with_overrides(
            cli.index_dir.clone(),
            cli.model.clone(),
            cli.log_level.clone(),
            cli.verbose,
            cli.no_color,
        )
    });

    // Logging comes up even when the config is broken, so `serve` can
    // report the failure
    match &config {
        Ok(config) => logging::init_logging(
            config.logging.level.as_deref(),
            config.no_color(),
            config.logging.json,
        )?,
        Err(_) => {
            let level = cli
                .log_level
                .clone()
                .or_else(|| cli.verbose.then(|| "debug".to_string()));
            logging::init_logging(level.as_deref(), cli.no_color, false)?
        }
    }

    tracing::info!("brandrag starting");

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Serve(_) => "serve",
        Commands::Eval(_) => "eval",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(config).await,
        Commands::Ingest(cmd) => cmd.execute(&config?).await,
        Commands::Ask(cmd) => cmd.execute(config?).await,
        Commands::Chat(cmd) => cmd.execute(config?).await,
        Commands::Eval(cmd) => cmd.execute(config?).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
