//! Offline fallbacks for failed network requests.

use anime_core::{Request, RequestClassification, Response, WorkerConfig};

/// Body of the synthesized data fallback.
pub const OFFLINE_DATA_MESSAGE: &str = "Data unavailable offline";

/// What to serve when the network fails and nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfflineFallback {
    /// Serve the cached offline page.
    OfflinePage(String),

    /// Serve the cached placeholder image, or a generated one.
    PlaceholderImage(String),

    /// Serve a JSON error body.
    OfflineJson,

    /// No fallback; the failure reaches the caller.
    None,
}

impl OfflineFallback {
    /// Pick the fallback for a request of the given classification.
    pub fn for_request(
        config: &WorkerConfig,
        class: RequestClassification,
        request: &Request,
    ) -> Self {
        match class {
            RequestClassification::Static if request.is_html() => {
                Self::OfflinePage(config.offline_page.clone())
            }
            RequestClassification::Image => Self::PlaceholderImage(config.placeholder_image.clone()),
            RequestClassification::Data => Self::OfflineJson,
            _ => Self::None,
        }
    }

    /// Whether a fallback applies at all.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// JSON error response served for data requests while offline.
pub fn offline_json() -> Response {
    Response::json(200, &serde_json::json!({ "error": OFFLINE_DATA_MESSAGE }))
}

/// Placeholder used when the configured placeholder image was never cached.
pub fn generated_placeholder() -> Response {
    let svg = concat!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="420" viewBox="0 0 300 420">"##,
        r##"<rect width="300" height="420" fill="#1f1f2e"/>"##,
        r##"<text x="150" y="215" fill="#8888aa" font-family="sans-serif" font-size="18" text-anchor="middle">Image unavailable</text>"##,
        "</svg>"
    );
    Response::ok(svg).with_header("content-type", "image/svg+xml")
}
