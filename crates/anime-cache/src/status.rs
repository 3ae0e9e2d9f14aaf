//! Outcome of a routed request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a routed response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from a bucket without touching the network.
    Hit,
    /// Fetched from the network (and written to a bucket).
    Miss,
    /// Network failed; served a cached copy or a substitute.
    Fallback,
    /// Not intercepted; passed straight to the network.
    Bypass,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Fallback => write!(f, "FALLBACK"),
            Self::Bypass => write!(f, "BYPASS"),
        }
    }
}
