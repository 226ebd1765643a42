//! Building the server state from configuration.
//!
//! Reads the configured Tiled map (or falls back to the built-in one) and
//! creates the hosted town, ready to hand to
//! [`start_server`](crate::server::start_server).

use std::path::Path;

use covey_town::{
    AreaDefinition, TownError, TownSettings, default_definitions, definitions_from_tiled_json,
};
use tracing::{info, warn};

use crate::config::CoveyConfig;
use crate::state::AppState;

/// Errors that can occur while preparing the server state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The configured map file could not be read.
    #[error("failed to read map {path}: {source}")]
    MapRead {
        /// The map path from the configuration.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The map or the town built from it is invalid.
    #[error("town setup failed: {source}")]
    Town {
        /// The underlying town error.
        #[from]
        source: TownError,
    },
}

/// Load area definitions from a Tiled map file.
///
/// # Errors
///
/// Returns [`StartupError::MapRead`] if the file cannot be read and
/// [`StartupError::Town`] if it is not a valid map.
pub fn load_map(path: &Path) -> Result<Vec<AreaDefinition>, StartupError> {
    let json = std::fs::read_to_string(path).map_err(|source| StartupError::MapRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(definitions_from_tiled_json(&json)?)
}

/// Build the application state for `config`.
///
/// # Errors
///
/// Returns [`StartupError`] if the map is not a valid Tiled map or defines
/// the same area twice. A map file that cannot be read falls back to the
/// built-in map.
pub fn build_state(config: &CoveyConfig) -> Result<AppState, StartupError> {
    let definitions = match &config.town.map_path {
        Some(path) => match load_map(path) {
            Err(e @ StartupError::MapRead { .. }) => {
                warn!(error = %e, "Map unavailable, using the built-in map");
                default_definitions()
            }
            other => other?,
        },
        None => {
            info!("No map configured, using the built-in map");
            default_definitions()
        }
    };

    let settings = TownSettings {
        friendly_name: config.town.friendly_name.clone(),
        is_publicly_listed: config.town.is_publicly_listed,
    };
    let mut state = AppState::new(config.broadcast.capacity);
    state.add_town(&config.town.town_id, settings, &definitions)?;
    info!(
        town = %config.town.town_id,
        areas = definitions.len(),
        "Town ready"
    );
    Ok(state)
}
