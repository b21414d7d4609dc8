//! Configuration system for trackforge.
//!
//! Load tracker configuration from TOML or YAML to control self-checking
//! and the key-layout search without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use trackforge_config::{EnvironmentMode, TrackerConfig, WorkerCount};
//!
//! let config = TrackerConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!
//!     [search]
//!     worker_count = { specific = 3 }
//!     sequential_threshold = 8
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert_eq!(config.search.worker_count, WorkerCount::Specific(3));
//! assert_eq!(config.search.sequential_threshold, 8);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use trackforge_config::TrackerConfig;
//!
//! let config = TrackerConfig::load("tracker.toml").unwrap_or_default();
//! assert!(!config.is_full_assert());
//! ```


use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackerConfig {
    /// Environment mode controlling self-checks.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Key-layout search configuration.
    #[serde(default)]
    pub search: SearchConfig,
}

impl TrackerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.worker_count == WorkerCount::Specific(0) {
            return Err(ConfigError::Invalid(
                "search.worker_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Sets the search worker count.
    pub fn with_worker_count(mut self, worker_count: WorkerCount) -> Self {
        self.search.worker_count = worker_count;
        self
    }

    /// Sets the candidate count at or below which searches run sequentially.
    pub fn with_sequential_threshold(mut self, threshold: usize) -> Self {
        self.search.sequential_threshold = threshold;
        self
    }

    /// Enables or disables per-search debug logging.
    pub fn with_search_logging(mut self, enabled: bool) -> Self {
        self.search.log_searches = enabled;
        self
    }

    /// Returns true if self-checks are enabled.
    pub fn is_full_assert(&self) -> bool {
        self.environment_mode == EnvironmentMode::FullAssert
    }
}

/// Environment mode affecting tracker behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// No self-checks.
    #[default]
    Production,

    /// Re-derive and compare after every incremental update.
    FullAssert,
}

/// Key-layout search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SearchConfig {
    /// Number of pooled working copies and search threads.
    pub worker_count: WorkerCount,

    /// Candidate counts at or below this run on the reserved copy.
    pub sequential_threshold: usize,

    /// Whether each search logs its statistics.
    pub log_searches: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            worker_count: WorkerCount::Auto,
            sequential_threshold: 4,
            log_searches: true,
        }
    }
}

/// Worker count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerCount {
    /// One less than the available processors, at least one.
    #[default]
    Auto,

    /// Specific number of workers.
    Specific(usize),
}

impl WorkerCount {
    /// Resolves the worker count to an actual number.
    pub fn resolve(&self) -> usize {
        match self {
            WorkerCount::Auto => {
                let cpus = std::thread::available_parallelism()
                    .map(|p| p.get())
                    .unwrap_or(1);
                cpus.saturating_sub(1).max(1)
            }
            WorkerCount::Specific(n) => (*n).max(1),
        }
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerCount::Auto => write!(f, "Auto"),
            WorkerCount::Specific(n) => write!(f, "{}", n),
        }
    }
}
