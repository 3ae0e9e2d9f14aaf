//! The network seam.

use anime_core::{Request, Response};
use async_trait::async_trait;

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Something that can perform a fetch.
///
/// Like the platform `fetch`, a response with an error status is still an
/// `Ok` response; only transport failures are errors. Use
/// [`ensure_success`] to treat non-2xx responses as failures.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform a request.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Turn a non-2xx response into a [`FetchError::Http`].
pub fn ensure_success(response: Response, url: &str) -> Result<Response, FetchError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Http {
            status: response.status,
            url: url.to_string(),
        })
    }
}

/// Fetch and require a 2xx response.
pub async fn fetch_ok(network: &dyn Network, request: &Request) -> Result<Response, FetchError> {
    let response = network.fetch(request).await?;
    ensure_success(response, &request.url)
}
