//! Application configuration module
//!
//! Provides configuration types for the sync engine. Configuration can be
//! built in code through [`AppConfigBuilder`] or parsed from TOML:
//!
//! ```toml
//! server_url = "http://localhost:3001"
//! request_timeout_ms = 30000
//! probe_interval_secs = 5
//! max_concurrent_requests = 4
//! missing_on_server = "recreate"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Default task server URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default connectivity probe period
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 5;
/// Default fan-out for per-record calls during reconciliation
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;

/// What an update does when the server reports the task unknown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingOnServer {
    /// Create the full local record on the server and re-key the local entry
    /// to the identity the server assigns
    #[default]
    Recreate,
    /// Leave the local record untouched until the next reconciliation pass
    Defer,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Task server base URL
    pub server_url: String,
    /// Upper bound for every outbound request, in milliseconds
    pub request_timeout_ms: u64,
    /// Connectivity probe period, in seconds
    pub probe_interval_secs: u64,
    /// Maximum in-flight requests per reconciliation step
    pub max_concurrent_requests: usize,
    /// Directory for the file-backed local store
    pub data_dir: Option<PathBuf>,
    /// Update-after-404 policy
    pub missing_on_server: MissingOnServer,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            data_dir: None,
            missing_on_server: MissingOnServer::default(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingValue("server_url"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_ms"));
        }
        if self.probe_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("probe_interval_secs"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue("max_concurrent_requests"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout_ms(mut self, millis: u64) -> Self {
        self.config.request_timeout_ms = millis;
        self
    }

    /// Set the probe period
    pub fn probe_interval_secs(mut self, secs: u64) -> Self {
        self.config.probe_interval_secs = secs;
        self
    }

    /// Set the reconciliation fan-out
    pub fn max_concurrent_requests(mut self, max: usize) -> Self {
        self.config.max_concurrent_requests = max;
        self
    }

    /// Set the local data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Set the update-after-404 policy
    pub fn missing_on_server(mut self, policy: MissingOnServer) -> Self {
        self.config.missing_on_server = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("value must be greater than zero: {0}")]
    InvalidValue(&'static str),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}
