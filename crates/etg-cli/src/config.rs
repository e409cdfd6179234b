//! CLI configuration
//!
//! Loaded from an optional TOML file. Every section and field has a default,
//! so an empty or missing file is a valid configuration.
//!
//! ```toml
//! [storage]
//! data_root = "data"
//!
//! [remote]
//! backend = "gcs"
//! bucket = "etg-data"
//! token_env = "ETG_GCS_TOKEN"
//! keep = 2
//!
//! [source]
//! bulk_url = "https://api.scryfall.com/bulk-data/default_cards"
//!
//! [log]
//! format = "pretty"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use etg_core::errors::{ExError, ExErrorKind};
use etg_engine::DEFAULT_KEEP;
use etg_online::scryfall::DEFAULT_BULK_URL;
use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "etg.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        ExError::new(ExErrorKind::Config)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub source: SourceConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Holds the `db/` and `zip/` directories
    pub data_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
        }
    }
}

/// Where pushed archives live
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    /// Google Cloud Storage bucket
    #[default]
    Gcs,
    /// Plain directory
    Dir,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: RemoteBackend,
    pub bucket: String,
    pub dir: PathBuf,
    /// Environment variable holding the GCS bearer token
    pub token_env: String,
    /// Archives kept remotely after a push
    pub keep: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: RemoteBackend::Gcs,
            bucket: "etg-data".to_string(),
            dir: PathBuf::from("remote"),
            token_env: "ETG_GCS_TOKEN".to_string(),
            keep: DEFAULT_KEEP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub bulk_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bulk_url: DEFAULT_BULK_URL.to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output (default)
    #[default]
    Pretty,
    /// JSON structured logging
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Load `explicit` if given, else `etg.toml` when present, else defaults
    ///
    /// # Errors
    ///
    /// An explicit path must exist; any file that is read must be valid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.remote.keep == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.keep",
                reason: "must keep at least one archive".to_string(),
            });
        }
        if self.remote.backend == RemoteBackend::Gcs && self.remote.bucket.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.bucket",
                reason: "required for the gcs backend".to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
