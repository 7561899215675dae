//! Table server entry point.
//!
//! Run with:
//! `cargo run --release -- --port 5555`
//! `RUST_LOG=plum_tables=debug cargo run -- --clock-seconds 300 --increment-seconds 2`

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use plum_tables::server::config::{ServerArgs, ServerConfig};
use plum_tables::server::listener::TableServer;

#[derive(Parser, Debug)]
#[command(name = "plum_tables", version, about = "Authoritative two-player chess table server")]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from(Cli::parse().server);
    let bind_addr = config.bind_addr();
    let server = TableServer::bind(config)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    server.run().await.context("table server stopped unexpectedly")?;
    Ok(())
}
