//! Node configuration
//!
//! Environment-based configuration with defaults and validation. Every
//! knob has a working default; environment variables override them one
//! by one.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

mod error;
pub use error::ConfigError;

/// Tunables for delta propagation and display polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often each session offers pending deltas to its peer
    #[serde(with = "humantime_serde")]
    pub push_interval: Duration,

    /// How often the local display task polls for new entries
    #[serde(with = "humantime_serde")]
    pub display_interval: Duration,

    /// Largest accepted wire frame body, in bytes
    pub max_frame_len: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            push_interval: Duration::from_millis(20),
            display_interval: Duration::from_millis(20),
            max_frame_len: 1024 * 1024, // 1 MiB
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: CONFAB_<KEY>
    /// Example: CONFAB_PUSH_INTERVAL_MS=50
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(interval) = env::var("CONFAB_PUSH_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid push interval: {}", e))
            })?;
            config.push_interval = Duration::from_millis(millis);
        }
        if let Ok(interval) = env::var("CONFAB_DISPLAY_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid display interval: {}", e))
            })?;
            config.display_interval = Duration::from_millis(millis);
        }
        if let Ok(len) = env::var("CONFAB_MAX_FRAME_LEN") {
            config.max_frame_len = len.parse().map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid max frame length: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.push_interval.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "push_interval must be greater than zero".to_string(),
            ));
        }
        if self.display_interval.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "display_interval must be greater than zero".to_string(),
            ));
        }
        if self.max_frame_len == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_frame_len must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
