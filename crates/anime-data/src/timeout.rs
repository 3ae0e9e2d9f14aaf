//! Timeout configuration for network clients.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts applied by [`HttpNetwork`](crate::HttpNetwork).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    /// Total request timeout in milliseconds.
    #[serde(default = "default_total_ms")]
    pub total_ms: u64,
}

fn default_connect_ms() -> u64 {
    3_000
}

fn default_total_ms() -> u64 {
    15_000
}

impl TimeoutConfig {
    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        let total_ms = total.as_millis() as u64;
        Self {
            connect_ms: (total_ms / 4).max(1),
            total_ms,
        }
    }

    /// Connection timeout.
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    /// Total request timeout.
    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            total_ms: default_total_ms(),
        }
    }
}
