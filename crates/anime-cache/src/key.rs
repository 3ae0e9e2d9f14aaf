//! Cache entry identity.

use std::fmt;

use anime_core::Request;
use serde::{Deserialize, Serialize};

/// Identity of a cached response: request method plus URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    /// Uppercase HTTP method.
    pub method: String,
    /// Request URL exactly as issued.
    pub url: String,
}

impl RequestKey {
    /// Create a key for a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }

    /// Create a key from a request.
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method.as_str().to_ascii_uppercase(),
            url: request.url.clone(),
        }
    }
}

impl From<&Request> for RequestKey {
    fn from(request: &Request) -> Self {
        Self::from_request(request)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
