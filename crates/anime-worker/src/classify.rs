//! Request classification by URL suffix.

use anime_core::{Request, RequestClassification};

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRule {
    /// Lowercase suffixes including the dot, e.g. `.css`.
    pub extensions: Vec<String>,
    /// Classification assigned when any suffix matches.
    pub classification: RequestClassification,
}

impl ExtensionRule {
    /// Create a rule.
    pub fn new(extensions: &[&str], classification: RequestClassification) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            classification,
        }
    }

    /// Whether a lowercase path ends with one of the suffixes.
    pub fn matches(&self, path: &str) -> bool {
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}

/// Ordered suffix table. The first matching rule wins; no match is
/// [`RequestClassification::Dynamic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestClassifier {
    rules: Vec<ExtensionRule>,
}

impl RequestClassifier {
    /// Create a classifier from an ordered rule table.
    pub fn new(rules: Vec<ExtensionRule>) -> Self {
        Self { rules }
    }

    /// The rule table.
    pub fn rules(&self) -> &[ExtensionRule] {
        &self.rules
    }

    /// Classify a request. Only the URL path is considered.
    pub fn classify(&self, request: &Request) -> RequestClassification {
        self.classify_url(&request.url)
    }

    /// Classify a URL.
    pub fn classify_url(&self, url: &str) -> RequestClassification {
        let path = anime_core::url_path(url).to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&path))
            .map(|rule| rule.classification)
            .unwrap_or(RequestClassification::Dynamic)
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(vec![
            ExtensionRule::new(
                &[".html", ".css", ".js", ".woff2", ".svg"],
                RequestClassification::Static,
            ),
            ExtensionRule::new(
                &[".jpg", ".jpeg", ".png", ".webp", ".gif"],
                RequestClassification::Image,
            ),
            ExtensionRule::new(&[".json"], RequestClassification::Data),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestClassification::*;

    #[test]
    fn test_default_table() {
        let classifier = RequestClassifier::default();

        assert_eq!(classifier.classify_url("/index.html"), Static);
        assert_eq!(classifier.classify_url("/css/main.css"), Static);
        assert_eq!(classifier.classify_url("/js/main.js"), Static);
        assert_eq!(classifier.classify_url("/assets/fonts/inter-var.woff2"), Static);
        assert_eq!(classifier.classify_url("/assets/icons/logo.svg"), Static);

        assert_eq!(classifier.classify_url("/images/naruto.jpg"), Image);
        assert_eq!(classifier.classify_url("/images/naruto.jpeg"), Image);
        assert_eq!(classifier.classify_url("/images/icon.png"), Image);
        assert_eq!(classifier.classify_url("/images/banner.webp"), Image);
        assert_eq!(classifier.classify_url("/images/loading.gif"), Image);

        assert_eq!(classifier.classify_url("/data/anime-list.json"), Data);

        assert_eq!(classifier.classify_url("/"), Dynamic);
        assert_eq!(classifier.classify_url("/api/trending"), Dynamic);
    }

    #[test]
    fn test_query_and_case_are_ignored() {
        let classifier = RequestClassifier::default();

        assert_eq!(classifier.classify_url("/css/main.css?v=1.0.0"), Static);
        assert_eq!(classifier.classify_url("/images/HERO.PNG"), Image);
        assert_eq!(
            classifier.classify_url("https://startanime.example/data/genres.json#top"),
            Data
        );
        assert_eq!(classifier.classify_url("/search?q=x.json"), Dynamic);
    }

    #[test]
    fn test_first_rule_wins() {
        let classifier = RequestClassifier::new(vec![
            ExtensionRule::new(&[".json"], Static),
            ExtensionRule::new(&[".json"], Data),
        ]);
        assert_eq!(classifier.classify_url("/manifest.json"), Static);
    }

    #[test]
    fn test_classify_request() {
        let classifier = RequestClassifier::default();
        assert_eq!(classifier.classify(&Request::get("/genres.html")), Static);
    }
}
