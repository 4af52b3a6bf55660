//! Persistent connection configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings of the outbound WebSocket connection.
///
/// Fixed for the lifetime of the adapter built from it.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Remote endpoint (`ws://` or `wss://`)
    pub url: String,

    /// Wait between a drop or failed attempt and the next attempt
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    /// Heartbeat period while connected
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,

    /// Account id reported in heartbeats and forwarded events
    #[serde(default)]
    pub self_id: u64,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay_ms: default_reconnect_delay(),
            heartbeat_interval_ms: default_heartbeat_interval(),
            self_id: 0,
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Validate connection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("connection.url"));
        }
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(ValidationError::InvalidConnectionUrl);
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ValidationError::InvalidReconnectDelay);
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ValidationError::InvalidHeartbeatInterval);
        }
        Ok(())
    }
}

fn default_reconnect_delay() -> u64 {
    5000
}

fn default_heartbeat_interval() -> u64 {
    30000
}
