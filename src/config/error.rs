//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Connection URL must use ws:// or wss://")]
    InvalidConnectionUrl,

    #[error("Reconnect delay must be positive")]
    InvalidReconnectDelay,

    #[error("Heartbeat interval must be positive")]
    InvalidHeartbeatInterval,

    #[error("Default call timeout must be between 1 and {max}ms")]
    InvalidCallTimeout { max: u64 },

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
