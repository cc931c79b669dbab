//! Client configuration loaded from environment variables.
//!
//! Loaded once at startup by the embedding application and handed to
//! [`crate::App`].

use std::env;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CivicFlow REST backend
    pub backend_url: String,
    /// Per-request timeout in seconds (a hung call must not park the
    /// report flow in Submitting forever)
    pub request_timeout_secs: u64,
    /// Path for the persisted session snapshot (token + profile)
    pub state_path: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            state_path: "civicflow-session.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("CIVICFLOW_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            request_timeout_secs: env::var("CIVICFLOW_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("CIVICFLOW_REQUEST_TIMEOUT_SECS"))?,
            state_path: env::var("CIVICFLOW_STATE_PATH")
                .unwrap_or_else(|_| "civicflow-session.json".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
