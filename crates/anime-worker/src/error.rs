//! Worker error types.

use anime_cache::CacheError;
use anime_core::LifecycleError;
use anime_data::FetchError;

/// Errors raised by worker lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A manifest URL could not be fetched during install.
    #[error("failed to pre-cache {url}: {source}")]
    Install {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A URL passed with `CACHE_URLS` could not be fetched.
    #[error("failed to cache {url}: {source}")]
    CacheUrls {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Cache storage failed.
    #[error("cache storage error: {0}")]
    Cache(#[from] CacheError),

    /// A lifecycle hook ran in the wrong state.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A client message could not be decoded.
    #[error("invalid client message: {0}")]
    InvalidMessage(#[from] serde_json::Error),
}

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;
