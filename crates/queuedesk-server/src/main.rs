//! # queuedesk-server
//!
//! Queue desk backend for an in-store service flow.
//!
//! This binary provides:
//! - **Queue control**: prefix-scoped ticket numbers assigned on scan, with
//!   admin increment / decrement / reset / delete
//! - **Counter registry** driven over a WebSocket push channel
//! - **REST API** (axum) for registrant import, invitation payloads,
//!   confirmation and lookup

mod api;
mod config;
mod counters;
mod error;
mod queue;
mod registrants;
mod ws;

use std::sync::Arc;

use queuedesk_store::Database;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,queuedesk_server=debug")),
        )
        .init();

    info!("Starting QueueDesk server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not set, admin endpoints are unauthenticated");
    }

    // -----------------------------------------------------------------------
    // 3. Open the store (fatal on failure)
    // -----------------------------------------------------------------------
    let database = match &config.database_path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            Database::open_at(path)?
        }
        None => Database::new()?,
    };
    let db = Arc::new(Mutex::new(database));

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;
    let app_state = AppState::new(db, config);

    tokio::select! {
        result = api::serve_http(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
