//! formstack server
//!
//! Serves the record and field-configuration API over HTTP, backed by a
//! SQLite database and an upload directory.
//!
//! Usage:
//!   formstack-server --port 8080 --data-dir ./formstack-data

use anyhow::{Context, Result};
use clap::Parser;
use formstack_server::build_router;
use formstack_server::config::{Args, ServerConfig};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from(Args::parse());
    let log_level = if config.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("formstack server starting...");
    let state = config.open_state()?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("HTTP API listening on {}", config.bind);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
