//! Serve command handler.

use crate::{bootstrap::build_pipeline, server};
use carqa_core::{config::AppConfig, AppResult};
use clap::Args;
use std::sync::Arc;

/// Serve the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut server_config = config.server.clone();
        if let Some(host) = &self.host {
            server_config.host = host.clone();
        }
        if let Some(port) = self.port {
            server_config.port = port;
        }

        let pipeline = Arc::new(build_pipeline(config).await?);
        server::serve(pipeline, &server_config).await
    }
}
