//! Configuration for the town server.
//!
//! The server reads `covey-config.yaml` from the working directory. Every
//! field has a default, so a missing file or a partial file is fine.
//!
//! Environment variables override YAML values:
//! - `PORT` overrides `server.port`
//! - `DEMO_TOWN_ID` overrides `town.town_id`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::server::ServerConfig;

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "covey-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration, mirroring `covey-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CoveyConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerConfig,

    /// The town hosted by this server.
    #[serde(default)]
    pub town: TownConfig,

    /// Broadcast fan-out settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CoveyConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply `PORT` and `DEMO_TOWN_ID` from the environment.
    ///
    /// A `PORT` that is not a valid port number is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(town_id) = std::env::var("DEMO_TOWN_ID") {
            self.town.town_id = town_id;
        }
    }
}

/// The town hosted by this server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TownConfig {
    /// Town id used in URLs.
    #[serde(default = "default_town_id")]
    pub town_id: String,

    /// Friendly name shown to players.
    #[serde(default = "default_friendly_name")]
    pub friendly_name: String,

    /// Whether the town is listed publicly.
    #[serde(default = "default_true")]
    pub is_publicly_listed: bool,

    /// Tiled map JSON to read areas from. The built-in map is used when
    /// unset.
    #[serde(default)]
    pub map_path: Option<PathBuf>,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            town_id: default_town_id(),
            friendly_name: default_friendly_name(),
            is_publicly_listed: true,
            map_path: None,
        }
    }
}

/// Broadcast fan-out settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Events buffered per town before slow clients start skipping ahead.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_town_id() -> String {
    String::from("demo")
}

fn default_friendly_name() -> String {
    String::from("Covey Town")
}

const fn default_true() -> bool {
    true
}

const fn default_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoveyConfig::parse("{}").unwrap();
        assert_eq!(config, CoveyConfig::default());
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.town.town_id, "demo");
        assert_eq!(config.broadcast.capacity, 256);
        assert!(!config.logging.json);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let yaml = r"
server:
  port: 9000
town:
  friendly_name: Night Market
  map_path: maps/indoors.json
logging:
  json: true
";
        let config = CoveyConfig::parse(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.town.friendly_name, "Night Market");
        assert_eq!(config.town.town_id, "demo");
        assert_eq!(config.town.map_path, Some(PathBuf::from("maps/indoors.json")));
        assert!(config.town.is_publicly_listed);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        assert!(matches!(
            CoveyConfig::parse("server: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            CoveyConfig::from_file(Path::new("does/not/exist.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
