//! Configuration file support for cinebase-check
//!
//! Reads configuration from `~/.config/cinebase-check/config.json`:
//!
//! ```json
//! {
//!   "base_url": "https://catalog.example.com/api",
//!   "timeout_secs": 30,
//!   "photo": "/home/me/cover.png"
//! }
//! ```
//!
//! Command-line flags and `CINEBASE_*` environment variables take precedence
//! over the file; the file takes precedence over the built-in defaults.

use crate::cli::Cli;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid base URL '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    #[error("Timeout must be at least one second")]
    ZeroTimeout,
}

/// Contents of the optional config file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub photo: Option<PathBuf>,
}

/// Settings for one run, after all layers are merged
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub photo: Option<PathBuf>,
}

impl FileConfig {
    /// Load configuration from the default path or return defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(FileConfig::default()),
        }
    }

    fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }
}

impl Settings {
    /// Merge CLI (which already carries environment overrides) over the file config
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let base_url = cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        let timeout_secs = cli
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Settings {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            photo: cli.photo.clone().or(file.photo),
        })
    }
}

fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Returns the config file path: `~/.config/cinebase-check/config.json`
pub fn config_path() -> Option<PathBuf> {
    // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;

    Some(config_base.join("cinebase-check").join("config.json"))
}
