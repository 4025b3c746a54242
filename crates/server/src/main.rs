//! banner server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use banner_client::HttpPipeline;
use banner_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let pipeline = HttpPipeline::from_config(&config)?;
    tracing::info!(
        listing = %config.listing_base_url,
        apis = %config.api_list_url,
        rng = %pipeline.rng_backend(),
        "Starting banner server on stdio transport"
    );

    let shutdown = CancellationToken::new();
    let handler = handler::BannerServer::new(Arc::new(pipeline), Arc::new(config), shutdown.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    shutdown.cancel();

    Ok(())
}
