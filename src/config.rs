//! Process configuration.
//!
//! Precedence: defaults < TOML file < environment < CLI flags (the binary applies the last).
//! The resulting `AppConfig` is built once at start-up and handed to whatever needs it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "ESTATELITE_CONFIG";
pub const CONFIG_FILE: &str = "estatelite.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 5000, cors_origins: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot directory. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub checkpoint_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: None, checkpoint_interval_secs: 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub level: String,
    pub retention: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: None, level: "info".into(), retention: 7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Image used when a listing is saved without any.
    pub placeholder_image_url: String,
    /// Page size of the public property listing.
    pub default_limit: usize,
    /// Page size of every other list (inquiries, accounts, my-properties).
    pub default_list_limit: usize,
    /// Largest `limit` the public listing accepts.
    pub max_public_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            placeholder_image_url: "https://via.placeholder.com/800x600?text=No+Image".into(),
            default_limit: 12,
            default_list_limit: 10,
            max_public_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub listing: ListingConfig,
}

impl AppConfig {
    /// Loads the first config file found (see `candidate_paths`) and applies environment overrides.
    ///
    /// # Errors
    /// Returns an error when `explicit` does not exist, a found file cannot be read or parsed,
    /// or an override is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // A path the operator named must exist; only the default locations are optional.
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            });
        }
        let mut cfg = match candidate_paths(explicit).into_iter().find(|p| p.exists()) {
            Some(path) => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns an error when the file cannot be read or is not valid TOML for this schema.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Applies `ESTATELITE_*` overrides read through `lookup`.
    ///
    /// # Errors
    /// Returns an error when `ESTATELITE_PORT` is not a port number.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("ESTATELITE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ESTATELITE_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "ESTATELITE_PORT".into(), value: port })?;
        }
        if let Some(dir) = lookup("ESTATELITE_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup("ESTATELITE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = lookup("ESTATELITE_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the config cannot be represented as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Config file locations in lookup order: explicit path, `$ESTATELITE_CONFIG`,
/// `./estatelite.toml`, `<user config dir>/estatelite/estatelite.toml`.
#[must_use]
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        paths.push(PathBuf::from(p));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(CONFIG_FILE));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join("estatelite").join(CONFIG_FILE));
    }
    paths
}
