//! WPE Configuration Module
//!
//! This module provides configuration types for the WPE worker node.
//!
//! Configuration is read from TOML files resolved against a search path
//! rooted at the `WPE_HOME` environment variable, with individual values
//! overridable from the command line after parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming the platform home directory.
pub const WPE_HOME_ENV: &str = "WPE_HOME";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "wpe_config.toml";

/// Configuration errors raised during bootstrap.
///
/// All of these are fatal: the process must exit before the worker core is
/// constructed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No configuration file was found on the search path.
    #[error("Configuration file '{0}' not found on search path")]
    FileNotFound(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file was not valid TOML for `WpeConfig`.
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value failed validation.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Verbosity level for the node's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::InvalidValue(format!(
                "Unknown log level: {}",
                s
            ))),
        }
    }
}

/// KME listener connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmeListenerConfig {
    /// URL of the KME listener accepting JSON-RPC requests
    pub url: String,
    /// Connection timeout for KME requests, in seconds
    pub connect_timeout_secs: u64,
}

impl Default for KmeListenerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:1948".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// Worker identification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Plain-text id of this worker within the pool
    pub id: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            id: "wpe-worker-1".to_string(),
        }
    }
}

/// Enclave identification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnclaveConfig {
    /// Logical enclave identifier; the worker identity digest is derived
    /// from this value
    pub id: String,
    /// Base name reported alongside the enclave measurement
    pub base_name: String,
}

impl Default for EnclaveConfig {
    fn default() -> Self {
        Self {
            id: "wpe-enclave".to_string(),
            base_name: "wpe".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log verbosity level
    pub level: LogLevel,
}

/// Complete configuration for a WPE worker node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WpeConfig {
    /// KME listener connection settings
    #[serde(default)]
    pub kme_listener: KmeListenerConfig,
    /// Worker identification
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Enclave identification
    #[serde(default)]
    pub enclave: EnclaveConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WpeConfig {
    /// Load configuration from the first of `files` found on `search_paths`.
    ///
    /// Paths are tried in order; the first file that exists is parsed. A file
    /// that exists but fails to read or parse is an error rather than a
    /// reason to fall through to later paths.
    pub fn load(files: &[String], search_paths: &[PathBuf]) -> ConfigResult<Self> {
        for file in files {
            for dir in search_paths {
                let candidate = dir.join(file);
                if candidate.is_file() {
                    return Self::from_file(&candidate);
                }
            }
        }
        Err(ConfigError::FileNotFound(files.join(", ")))
    }

    /// Parse configuration from a single TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WpeConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Default search path: the working directory, then `$WPE_HOME/config`.
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".")];
        if let Ok(home) = std::env::var(WPE_HOME_ENV) {
            paths.push(PathBuf::from(home).join("config"));
        }
        paths
    }

    /// Apply command-line overrides after file parsing.
    pub fn apply_overrides(
        &mut self,
        kme_listener_url: Option<String>,
        worker_id: Option<String>,
    ) {
        if let Some(url) = kme_listener_url {
            self.kme_listener.url = url;
        }
        if let Some(id) = worker_id {
            self.worker.id = id;
        }
    }

    /// Reject configurations the worker cannot start with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.kme_listener.url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "kme_listener.url must not be empty".to_string(),
            ));
        }
        if self.worker.id.is_empty() {
            return Err(ConfigError::InvalidValue(
                "worker.id must not be empty".to_string(),
            ));
        }
        if self.enclave.id.is_empty() {
            return Err(ConfigError::InvalidValue(
                "enclave.id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
