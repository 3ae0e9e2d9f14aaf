//! Transport-neutral request and response model.

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// Ordered header list. Lookups are case-insensitive.
pub type Headers = Vec<(String, String)>;

/// An outbound or intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL or site-relative path.
    pub url: String,
    /// Request headers.
    pub headers: Headers,
}

impl Request {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Whether this is a GET request.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// The path portion of the URL, without query string or fragment.
    pub fn path(&self) -> String {
        url_path(&self.url)
    }

    /// Whether the URL names an HTML document.
    pub fn is_html(&self) -> bool {
        self.path().to_ascii_lowercase().ends_with(".html")
    }
}

/// A response from the network, the cache, or a synthesized fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Create a 200 response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Create a JSON response.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string()).with_header("content-type", "application/json")
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The `content-type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.status)
            .map(|s| s.is_success())
            .unwrap_or(false)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Extract the path of an absolute URL or a site-relative reference.
pub fn url_path(raw: &str) -> String {
    if let Ok(parsed) = url::Url::parse(raw) {
        return parsed.path().to_string();
    }
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    raw[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_strips_query_and_fragment() {
        assert_eq!(url_path("/css/main.css?v=3"), "/css/main.css");
        assert_eq!(url_path("/about.html#team"), "/about.html");
        assert_eq!(
            url_path("https://startanime.example/data/genres.json?x=1"),
            "/data/genres.json"
        );
    }

    #[test]
    fn test_request_is_html() {
        assert!(Request::get("/offline.html").is_html());
        assert!(Request::get("https://startanime.example/About.HTML").is_html());
        assert!(!Request::get("/js/app.js").is_html());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = Response::ok("{}").with_header("Content-Type", "application/json");
        assert_eq!(resp.content_type(), Some("application/json"));
    }

    #[test]
    fn test_is_success() {
        assert!(Response::new(204, "").is_success());
        assert!(!Response::new(404, "").is_success());
        assert!(!Response::new(1000, "").is_success());
    }

    #[test]
    fn test_json_response() {
        let resp = Response::json(200, &serde_json::json!({"a": 1}));
        let value: serde_json::Value = resp.json_body().unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(resp.content_type(), Some("application/json"));
    }
}
