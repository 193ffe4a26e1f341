//! Configuration management for the sync client.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote field-data service
    pub base_url: String,
    /// Identifier of the field agent working on this device
    pub agent_id: String,
    /// Directory holding the serialized collections
    pub data_dir: PathBuf,
    /// Timeout applied to each remote request
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        let agent_id = env::var("AGENT_ID").map_err(|_| ConfigError::MissingAgentId)?;

        let data_dir = env::var("DATA_DIR")
            .unwrap_or_else(|_| "data".to_string())
            .into();

        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidTimeout)?;

        Ok(Self {
            base_url,
            agent_id,
            data_dir,
            http_timeout,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BASE_URL environment variable is required")]
    MissingBaseUrl,

    #[error("AGENT_ID environment variable is required")]
    MissingAgentId,

    #[error("Invalid HTTP_TIMEOUT_SECS value")]
    InvalidTimeout,
}
