//! Configuration for the `schedule` CLI.
//!
//! Read from TOML. Every section and field is optional; missing values fall
//! back to the defaults below.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/schedule"
//! events_file = "events.txt"
//! participants_file = "participants.txt"
//!
//! [ledger]
//! release = "coalesce"   # or "append"
//!
//! [display]
//! default_sort = "priority"   # or "start", "end"
//! ```

use std::path::{Path, PathBuf};

use schedule_engine::{ReleasePolicy, SortKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "schedule.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ledger: LedgerConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding both data files.
    pub data_dir: PathBuf,
    pub events_file: String,
    pub participants_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            events_file: "events.txt".to_string(),
            participants_file: "participants.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// How freed time returns to a participant's ledger.
    pub release: ReleasePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub default_sort: SortKey,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `explicit` if given, else `./schedule.toml` if present, else
    /// use defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::debug!("Loading config from: {}", local.display());
            return Self::from_file(local);
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.events_file.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.events_file must not be empty".to_string()));
        }
        if self.storage.participants_file.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.participants_file must not be empty".to_string(),
            ));
        }
        if self.storage.events_file == self.storage.participants_file {
            return Err(ConfigError::Invalid(
                "storage.events_file and storage.participants_file must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn events_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.events_file)
    }

    pub fn participants_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.participants_file)
    }
}
