//! Configuration for the aggregation engine and its refresh job.
//!
//! Supports YAML file and environment variable overrides. The engagement
//! API bearer token is deliberately absent here; it is read from the
//! environment only.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Engagement metrics endpoint configuration.
    pub engagement: EngagementConfig,
    /// Notification sink configuration.
    pub notifier: NotifierConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type (sqlite).
    #[serde(rename = "type")]
    pub storage_type: String,
    /// Path to database file.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: "sqlite".to_string(),
            path: "./data/reftally.db".to_string(),
        }
    }
}

/// Engagement metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Metrics endpoint URL.
    pub endpoint: String,
    /// Maximum post ids per request.
    pub batch_size: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.x.com/2/tweets".to_string(),
            batch_size: 100,
            timeout_secs: 30,
        }
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Incoming-webhook URL. Unset disables notifications.
    pub webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from file
        let config_path =
            std::env::var("REFTALLY_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Ok(endpoint) = std::env::var("ENGAGEMENT_ENDPOINT") {
            self.engagement.endpoint = endpoint;
        }

        if let Ok(batch_size) = std::env::var("ENGAGEMENT_BATCH_SIZE") {
            if let Ok(b) = batch_size.parse() {
                self.engagement.batch_size = b;
            }
        }

        if let Ok(url) = std::env::var("NOTIFY_WEBHOOK_URL") {
            self.notifier.webhook_url = Some(url);
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}
