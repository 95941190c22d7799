//! Vault Mock Server
//!
//! Serves the in-memory Vault API from `vault_mock_server` for local runs of
//! `vrolectl` and the acceptance scenarios.
//!
//! Environment Variables:
//! - PORT: Port to listen on (default: 8200)
//! - VAULT_DEV_ROOT_TOKEN_ID: Token clients must send (default: root)
//! - RUST_LOG: Log filter (default: info)

use anyhow::Context;
use std::env;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vault_mock_server::{serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let port = env::var("PORT")
        .unwrap_or_else(|_| "8200".to_string())
        .parse::<u16>()
        .context("PORT must be a valid u16")?;
    let root_token = env::var("VAULT_DEV_ROOT_TOKEN_ID").unwrap_or_else(|_| "root".to_string());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Starting Vault mock server...");
    info!("✅ Vault mock server ready at http://{}", addr);
    serve(listener, AppState::new(&root_token)).await
}
