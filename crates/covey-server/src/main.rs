//! Town server binary for Covey Town.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `covey-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the hosted town from the configured map
//! 4. Serve HTTP and `WebSocket` until `Ctrl-C`

use std::path::Path;
use std::sync::Arc;

use covey_server::config::{CONFIG_FILE, ConfigError, CoveyConfig, LoggingConfig};
use covey_server::{build_state, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the town server.
///
/// # Errors
///
/// Returns an error if configuration, town setup or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("covey-server starting");
    if from_file {
        info!(path = CONFIG_FILE, "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }

    // 3. Build the town.
    let state = Arc::new(build_state(&config)?);

    // 4. Serve.
    start_server(&config.server, state).await?;
    Ok(())
}

/// Load configuration from `covey-config.yaml`, or defaults (with
/// environment overrides) if the file does not exist.
fn load_config() -> Result<(CoveyConfig, bool), ConfigError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((CoveyConfig::from_file(config_path)?, true))
    } else {
        let mut config = CoveyConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
