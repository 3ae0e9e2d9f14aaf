//! Serve a built site directory from disk.

use std::path::{Component, Path, PathBuf};

use anime_core::{url_path, Request, Response};
use async_trait::async_trait;
use http::Method;

use crate::client::{FetchError, Network};

/// Network that answers requests from files under a site root.
///
/// Behaves like a plain static file server: `/` and directory paths map to
/// `index.html`, missing files answer 404, non-GET/HEAD methods answer 405.
#[derive(Debug, Clone)]
pub struct SiteDirNetwork {
    root: PathBuf,
}

impl SiteDirNetwork {
    /// Serve files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Site root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request URL to a file under the root.
    pub fn file_for(&self, url: &str) -> Result<PathBuf, FetchError> {
        let path = url_path(url);
        let mut file = self.root.clone();

        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => file.push(part),
                Component::CurDir => {}
                _ => return Err(FetchError::InvalidUrl(url.to_string())),
            }
        }

        if path.is_empty() || path.ends_with('/') {
            file.push("index.html");
        }

        Ok(file)
    }
}

#[async_trait]
impl Network for SiteDirNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if request.method != Method::GET && request.method != Method::HEAD {
            return Ok(Response::new(405, "Method Not Allowed"));
        }

        let file = self.file_for(&request.url)?;
        match tokio::fs::read(&file).await {
            Ok(body) => {
                let body = if request.method == Method::HEAD {
                    Vec::new()
                } else {
                    body
                };
                Ok(Response::ok(body).with_header("content-type", content_type_for(&file)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Response::new(404, "Not Found"))
            }
            Err(e) => Err(FetchError::Request(format!("{}: {}", file.display(), e))),
        }
    }
}

/// Content type for a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
