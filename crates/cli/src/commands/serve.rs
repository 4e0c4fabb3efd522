//! Serve command handler.

use brandrag_core::{AppError, AppResult, RagConfig};
use brandrag_server::PipelineInit;
use clap::Args;

/// Run the HTTP API and web form
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Listen address (default: server_addr from config)
    #[arg(short, long, env = "BRANDRAG_ADDR")]
    pub addr: Option<String>,
}

impl ServeCommand {
    /// Start the server. A broken config or index leaves it running in
    /// degraded mode instead of exiting.
    pub async fn execute(&self, config: AppResult<RagConfig>) -> AppResult<()> {
        let addr = match (&self.addr, &config) {
            (Some(addr), _) => addr.clone(),
            (None, Ok(config)) => config.server_addr.clone(),
            (None, Err(_)) => RagConfig::default().server_addr,
        };
        tracing::info!("Executing serve command on {}", addr);

        let init = PipelineInit::initialize(config).await;

        brandrag_server::serve(&addr, init)
            .await
            .map_err(|e| AppError::Other(format!("Server failed: {:#}", e)))
    }
}
