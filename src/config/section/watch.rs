//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! debounce_ms = 500        # Quiet period before a change is evaluated
//! retry_attempts = 10      # Attempts for empty or half-written scene files
//! retry_backoff_ms = 500   # Delay between attempts
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Change detection and reload retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            retry_attempts: 10,
            retry_backoff_ms: 500,
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
