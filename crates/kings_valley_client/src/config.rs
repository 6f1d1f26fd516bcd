//! Client configuration.

use crate::error::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable that overrides the service base URL.
pub const API_URL_ENV: &str = "KINGS_VALLEY_API_URL";

/// Settings for talking to the game service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service base URL; endpoints live under `{api_url}/api`.
    #[serde(default = "default_api_url")]
    api_url: String,

    /// Period of the authoritative-state poll.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// How long an error banner stays visible.
    #[serde(default = "default_error_ttl_ms")]
    error_ttl_ms: u64,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,
}

#[instrument]
fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

#[instrument]
fn default_poll_interval_ms() -> u64 {
    2_000
}

#[instrument]
fn default_error_ttl_ms() -> u64 {
    3_000
}

#[instrument]
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            error_ttl_ms: default_error_ttl_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(api_url = %config.api_url, "Config loaded successfully");
        Ok(config)
    }

    /// Resolves the effective configuration: file (or defaults), then the
    /// environment, then an explicit override.
    #[instrument(skip(path))]
    pub fn resolve(path: Option<&Path>, api_url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                info!("Config file not found at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            debug!(url = %url, "Using API URL from environment");
            config.api_url = url;
        }
        if let Some(url) = api_url {
            debug!(url = %url, "Using API URL from command line");
            config.api_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Replaces the base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Root of the REST endpoints, without a trailing slash.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api_url.trim_end_matches('/'))
    }

    /// Poll period as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Error banner lifetime as a [`Duration`].
    pub fn error_ttl(&self) -> Duration {
        Duration::from_millis(self.error_ttl_ms)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::new(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::new("poll_interval_ms must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_service_cadence() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.error_ttl(), Duration::from_secs(3));
        assert_eq!(config.api_root(), "http://localhost:8000/api");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "api_url = \"https://games.example.com/\"").expect("Write failed");

        let config = ClientConfig::from_file(file.path()).expect("Load failed");
        assert_eq!(config.api_root(), "https://games.example.com/api");
        assert_eq!(*config.poll_interval_ms(), 2_000);
    }

    #[test]
    fn rejects_non_http_url() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "api_url = \"ftp://nope\"").expect("Write failed");
        assert!(ClientConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let config = ClientConfig::resolve(
            Some(&dir.path().join("absent.toml")),
            Some("http://127.0.0.1:9000".to_string()),
        )
        .expect("Resolve failed");
        assert_eq!(config.api_url(), "http://127.0.0.1:9000");
    }
}
