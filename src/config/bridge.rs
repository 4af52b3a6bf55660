//! Correlation bridge configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_CALL_TIMEOUT_MS: u64 = 300_000;

/// Settings of the event correlation bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Timeout for calls that do not set their own
    #[serde(default = "default_timeout")]
    pub default_timeout_ms: u64,
}

impl BridgeConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Validate bridge configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_timeout_ms == 0 || self.default_timeout_ms > MAX_CALL_TIMEOUT_MS {
            return Err(ValidationError::InvalidCallTimeout {
                max: MAX_CALL_TIMEOUT_MS,
            });
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5000
}
