//! Town server lifecycle management.
//!
//! Provides [`start_server`], which binds to a TCP port and serves the
//! router until `Ctrl-C`. On shutdown every hosted town announces
//! `townClosing`, which ends each client's socket so the graceful
//! shutdown can complete.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Listen address of the town server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8081
}

/// Start the town server.
///
/// Binds to the configured address, builds the router and serves
/// requests until `Ctrl-C` is received.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let router = build_router(Arc::clone(&state));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, towns = state.town_count(), "Town server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Town server stopped");
    Ok(())
}

/// Resolve on `Ctrl-C`, after telling every town's clients to leave.
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown requested, closing towns");
    state.close_all().await;
}

/// Errors that can occur when starting or running the town server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
