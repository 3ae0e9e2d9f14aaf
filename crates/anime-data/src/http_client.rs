//! Fetch over HTTP(S).

use anime_core::{Headers, Request, Response};
use async_trait::async_trait;
use url::Url;

use crate::client::{FetchError, Network};
use crate::timeout::TimeoutConfig;

/// Network backed by a real HTTP client.
///
/// Site-relative request URLs (`/css/main.css`, `./components/x.html`) are
/// resolved against the base URL.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
    base: Url,
}

impl HttpNetwork {
    /// Create a client for a site.
    pub fn new(base_url: &str, timeouts: &TimeoutConfig) -> Result<Self, FetchError> {
        let base = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("startanime-worker/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeouts.connect())
            .timeout(timeouts.total())
            .build()
            .map_err(|e| FetchError::Request(format!("Client error: {}", e)))?;

        Ok(Self { client, base })
    }

    /// Base URL requests are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a request URL against the base.
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.base
            .join(url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = self.resolve(&request.url)?;

        let mut builder = self.client.request(request.method.clone(), url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| classify_error(&url, e))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(&url, e))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else if e.is_connect() {
        FetchError::Connection(format!("{}: {}", url, e))
    } else {
        FetchError::Request(format!("{}: {}", url, e))
    }
}
