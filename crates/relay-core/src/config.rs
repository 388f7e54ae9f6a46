//! Configuration module for relay clients

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Address, DEFAULT_TIMEOUT_MS};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Server address could not be parsed
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client ID
    pub client_id: String,

    /// Default request timeout in milliseconds (0 = no timeout)
    pub default_timeout_ms: u64,

    /// Backend server addresses (host:port)
    pub servers: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: uuid::Uuid::new_v4().to_string(),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            servers: vec![],
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = ClientConfig::default();

        // Client ID
        if let Ok(client_id) = std::env::var("CLIENT_ID") {
            config.client_id = client_id;
        }

        // Default timeout
        if let Ok(timeout) = std::env::var("DEFAULT_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.parse() {
                config.default_timeout_ms = timeout;
            }
        }

        // Servers
        if let Ok(servers) = std::env::var("SERVERS") {
            config.servers = servers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config
    }

    /// Parse the configured server list into socket addresses
    pub fn server_addrs(&self) -> Result<Vec<Address>, ConfigError> {
        self.servers
            .iter()
            .map(|s| {
                s.parse()
                    .map_err(|_| ConfigError::InvalidAddress(s.clone()))
            })
            .collect()
    }
}
