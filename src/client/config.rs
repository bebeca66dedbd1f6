use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, MissingOnServer};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "TASKBOARD_CONFIG";
/// Environment variable overriding the server URL
pub const API_URL_ENV: &str = "TASKBOARD_API_URL";

/// Client configuration wrapper.
///
/// Wraps the validated [`AppConfig`] and exposes it in the shapes the sync
/// engine needs (`Duration`s, full endpoint URLs, a resolved data directory).
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self { app: AppConfig::default() }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the environment
    ///
    /// Reads the TOML file named by `TASKBOARD_CONFIG` when set, then applies
    /// the `TASKBOARD_API_URL` override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut app = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::read_file(Path::new(&path))?,
            Err(_) => AppConfig::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            app.server_url = url;
        }
        app.validate()?;
        Ok(Self { app })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self { app: Self::read_file(path)? })
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Ok(Self { app })
    }

    fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        AppConfig::from_toml_str(&source)
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.trim_end_matches('/')
    }

    /// Upper bound for every outbound request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.app.request_timeout_ms)
    }

    /// Connectivity probe period
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.app.probe_interval_secs)
    }

    /// Maximum in-flight requests per reconciliation step
    pub fn max_concurrent_requests(&self) -> usize {
        self.app.max_concurrent_requests
    }

    pub fn missing_on_server(&self) -> MissingOnServer {
        self.app.missing_on_server
    }

    /// Directory for the file-backed store
    ///
    /// Falls back to the platform data directory (or the temp directory)
    /// joined with `taskboard`.
    pub fn data_dir(&self) -> PathBuf {
        self.app.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
            path.push("taskboard");
            path
        })
    }

    /// Underlying application configuration
    pub fn app(&self) -> &AppConfig {
        &self.app
    }
}
