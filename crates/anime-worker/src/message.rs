//! Messages exchanged between page clients and the worker.

use serde::{Deserialize, Serialize};

/// A command posted by a page to the worker. There is no reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Activate the waiting worker immediately.
    SkipWaiting,

    /// Fetch the URLs and add them to the dynamic bucket.
    CacheUrls { urls: Vec<String> },

    /// Delete a bucket by name.
    DeleteCache {
        #[serde(rename = "cacheName")]
        cache_name: String,
    },
}

impl ClientMessage {
    /// Decode a message from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SkipWaiting => "SKIP_WAITING",
            Self::CacheUrls { .. } => "CACHE_URLS",
            Self::DeleteCache { .. } => "DELETE_CACHE",
        }
    }
}

/// A notice broadcast by the worker to every page client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// A new version is installed while an older one still controls pages.
    UpdateAvailable,

    /// Control passed to a new version; pages should reload.
    ReloadPage,
}

impl WorkerMessage {
    /// JSON form as posted to clients.
    pub fn to_json(&self) -> String {
        match self {
            Self::UpdateAvailable => r#"{"type":"UPDATE_AVAILABLE"}"#.to_string(),
            Self::ReloadPage => r#"{"type":"RELOAD_PAGE"}"#.to_string(),
        }
    }
}
