//! Tracker configuration: where the two documents live and the default
//! points/price for new items.
//!
//! Persisted as TOML (`config.toml` in the working directory unless told
//! otherwise). Environment variables override file values; command-line flags
//! override both. The resolved [`Config`] is passed explicitly to
//! [`crate::tracker::Tracker`]; nothing here is global.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;
use crate::store::atomic::write_atomic;

/// Errors from configuration handling.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {}", path.display())]
    #[diagnostic(
        code(todo::config::read),
        help("Ensure the config file is readable, or pass another one with --config.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {}: {message}", path.display())]
    #[diagnostic(
        code(todo::config::parse),
        help("Check the TOML syntax. Delete the file to regenerate it with default values.")
    )]
    Parse { path: PathBuf, message: String },

    #[error("failed to write config: {}", path.display())]
    #[diagnostic(
        code(todo::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("invalid value for {var}: \"{value}\"")]
    #[diagnostic(
        code(todo::config::invalid_env),
        help("{var} must be a non-negative integer.")
    )]
    InvalidEnv { var: &'static str, value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Environment variable overriding `storage.todo_file`.
pub const ENV_TODO_FILE: &str = "STORAGE_TODO_FILE";
/// Environment variable overriding `storage.reward_file`.
pub const ENV_REWARD_FILE: &str = "STORAGE_REWARD_FILE";
/// Environment variable overriding `defaults.task_points`.
pub const ENV_TASK_POINTS: &str = "DEFAULTS_TASK_POINTS";
/// Environment variable overriding `defaults.reward_price`.
pub const ENV_REWARD_PRICE: &str = "DEFAULTS_REWARD_PRICE";

/// Full tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub defaults: DefaultsConfig,
}

/// Locations of the persisted documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub todo_file: PathBuf,
    pub reward_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            todo_file: PathBuf::from("todo.json"),
            reward_file: PathBuf::from("rewards.json"),
        }
    }
}

/// Values used when the user does not give points or a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub task_points: u32,
    pub reward_price: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            task_points: 20,
            reward_price: 20,
        }
    }
}

impl Config {
    /// Default config file name, looked up in the working directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from `path`, writing a file with default values first if none
    /// exists yet.
    pub fn load_or_init(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        config.save(path)?;
        tracing::warn!(
            path = %path.display(),
            "config file not found, created one with default values"
        );
        Ok(config)
    }

    /// Save to a TOML file, replacing it atomically.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        write_atomic(path, content.as_bytes()).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> ConfigResult<Self> {
        if let Some(path) = lookup(ENV_TODO_FILE).filter(|v| !v.is_empty()) {
            self.storage.todo_file = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_REWARD_FILE).filter(|v| !v.is_empty()) {
            self.storage.reward_file = PathBuf::from(path);
        }
        if let Some(points) = parse_env(&lookup, ENV_TASK_POINTS)? {
            self.defaults.task_points = points;
        }
        if let Some(price) = parse_env(&lookup, ENV_REWARD_PRICE)? {
            self.defaults.reward_price = price;
        }
        Ok(self)
    }
}

fn parse_env(
    lookup: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
) -> ConfigResult<Option<u32>> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
