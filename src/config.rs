//! Configuration for the task board binary.

use crate::repository::DEFAULT_STORAGE_KEY;
use crate::storage::DEFAULT_QUOTA_BYTES;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs.
const APP_DIR: &str = "taskboard";

/// Config file name.
const CONFIG_FILE: &str = "config.yaml";

/// SQLite database file.
const DB_FILE: &str = "taskboard.db";

/// Settings read from `config.yaml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the database (default: platform local data dir)
    pub data_dir: Option<PathBuf>,

    /// Key the task list is stored under
    pub storage_key: String,

    /// Storage budget in bytes; writes past it fail as "storage full"
    pub quota_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl Config {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the storage budget (None = unlimited).
    pub fn quota_bytes(mut self, quota: Option<usize>) -> Self {
        self.quota_bytes = quota;
        self
    }

    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolved data directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Path of the SQLite database.
    pub fn db_path(&self) -> PathBuf {
        self.resolved_data_dir().join(DB_FILE)
    }
}

/// `<data_local_dir>/taskboard`, or `./.taskboard` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR)))
}

/// Directory for log files.
pub fn log_dir() -> PathBuf {
    default_data_dir().join("logs")
}
