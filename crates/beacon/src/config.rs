//! Broadcast configuration: loading, first-run bootstrap, and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use beacon_net::{AUTO, AddressResolver, DEFAULT_PROBE_TARGET, resolve_port};
use serde::{Deserialize, Serialize};

/// Written to the data directory on first run.
pub const DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading configuration.
///
/// All of them are fatal to initialization: the controller is never
/// constructed from a configuration that failed to load.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Creating or reading the configuration file failed.
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file isn't valid TOML, or has fields of the wrong type.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed, but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the broadcast controller.
///
/// Every field has a default, so a partial (or empty) file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Advertised address, or `"auto"` to detect it.
    pub remote_address: String,

    /// Advertised port, or `"auto"` to use the server's listening port.
    /// Kept as a string because of the sentinel.
    pub remote_port: String,

    /// Seconds between heartbeats. Also the delay before the first one.
    pub update_interval: u64,

    /// `host:port` contacted by the outbound address probe.
    pub probe_target: String,

    /// Seconds before the outbound probe gives up.
    pub probe_timeout_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            remote_address: AUTO.to_string(),
            remote_port: AUTO.to_string(),
            update_interval: 30,
            probe_target: DEFAULT_PROBE_TARGET.to_string(),
            probe_timeout_secs: 10,
        }
    }
}

impl BroadcastConfig {
    /// Loads `config.toml` from `data_dir`, writing the default file first
    /// if none exists yet.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file can't be created or read,
    /// [`ConfigError::Parse`] / [`ConfigError::Invalid`] if its contents
    /// are unusable.
    pub fn load_or_create(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
                path: data_dir.to_path_buf(),
                source,
            })?;
            std::fs::write(&path, DEFAULT_CONFIG).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "wrote default config");
        }

        Self::load_from_file(&path)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    /// See [`load_or_create`](Self::load_or_create).
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse fine but can't be used.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval == 0 {
            return Err(ConfigError::Invalid(
                "update_interval must be greater than 0".into(),
            ));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "probe_timeout_secs must be greater than 0".into(),
            ));
        }
        // The listen port is irrelevant here, only the literal is checked.
        resolve_port(&self.remote_port, 1)
            .map_err(|e| ConfigError::Invalid(format!("remote_port: {e}")))?;
        Ok(())
    }

    /// Heartbeat period.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    /// The address resolver described by the probe settings.
    pub fn resolver(&self) -> AddressResolver {
        AddressResolver::with_probe(
            self.probe_target.clone(),
            Duration::from_secs(self.probe_timeout_secs),
        )
    }
}
