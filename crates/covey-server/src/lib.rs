//! Town server for Covey Town interactable-area synchronization.
//!
//! This crate binds the server-authoritative town from `covey-town` to
//! the network:
//!
//! - **`WebSocket` endpoint** (`/ws/towns/{town_id}`) carrying the socket
//!   event vocabulary in both directions, fanned out per town through
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for reading area snapshots
//! - **YAML configuration** and startup helpers for the binary
//!
//! # Architecture
//!
//! Each hosted town sits behind an async mutex; every inbound message is
//! handled to completion before the next. Everything the town broadcasts
//! goes to a broadcast channel that every socket of that town subscribes
//! to, with automatic lag handling.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, CoveyConfig};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, build_state};
pub use state::{AppState, TownBroadcaster, TownHandle};
