//! Configuration management for smnview
//!
//! Settings come from an optional JSON file. Every field has a default, so an
//! empty object (or no file at all) is a valid configuration. Command-line
//! flags are applied on top by `main`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{default_cache_path, CACHE_FILE_NAME};
use crate::error::{AppError, Result};

/// SMN station feed
pub const DEFAULT_SOURCE_URL: &str = "https://ws.smn.gob.ar/map_items/weather";

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Endpoint the fetcher queries
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Upper bound for the single outbound request
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Cached data older than this is refreshed
    #[serde(default = "default_interval")]
    pub refresh_interval_minutes: u64,

    /// Refresh on read and on a timer while serving
    #[serde(default)]
    pub auto_refresh: bool,

    /// Cache file location; the XDG cache directory when unset
    #[serde(default)]
    pub cache_file: Option<PathBuf>,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory static files are served from
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_interval() -> u64 {
    15
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_root() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root: default_root(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            timeout_secs: default_timeout(),
            refresh_interval_minutes: default_interval(),
            auto_refresh: false,
            cache_file: None,
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults when it
    /// does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Rejects values the refresher and fetcher cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_minutes == 0 {
            return Err(AppError::Config(
                "refresh_interval_minutes must be greater than zero".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured cache file, else the per-user cache directory, else the
    /// working directory
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file
            .clone()
            .or_else(default_cache_path)
            .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME))
    }
}
