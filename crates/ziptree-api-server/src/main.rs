//! API Server Binary Entry Point

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ziptree_api_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ziptree_api_server=info,ziptree_archive=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    config.validate().context("Invalid server configuration")?;

    tracing::info!("Starting ZIP Tree Visualizer Server");
    start_server(&config)
        .await
        .with_context(|| format!("Server on {} stopped", config.addr))?;

    Ok(())
}
