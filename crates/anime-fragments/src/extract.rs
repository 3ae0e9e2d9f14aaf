//! Picking a component's markup out of a fetched page.

use std::collections::BTreeMap;

use scraper::{Html, Selector};

/// Whether fetched text is a bare template rather than a full page.
///
/// Templates carry an HTML comment that mentions "template".
pub fn is_template(text: &str) -> bool {
    let mut rest = text;
    while let Some(start) = rest.find("<!--") {
        let after = &rest[start + 4..];
        let Some(end) = after.find("-->") else {
            return false;
        };
        if after[..end].to_ascii_lowercase().contains("template") {
            return true;
        }
        rest = &after[end + 3..];
    }
    false
}

/// CSS selector per component name. Components without a rule, or whose
/// rule matches nothing, contribute the page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    selectors: BTreeMap<String, String>,
}

impl ExtractionRules {
    /// No rules; every page contributes its body.
    pub fn empty() -> Self {
        Self {
            selectors: BTreeMap::new(),
        }
    }

    /// Add or replace the rule for a component.
    pub fn with_rule(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        self.selectors.insert(name.into(), selector.into());
        self
    }

    /// Selector for a component.
    pub fn selector_for(&self, name: &str) -> Option<&str> {
        self.selectors.get(name).map(String::as_str)
    }

    /// Extract the markup for `name` from fetched text.
    pub fn extract(&self, name: &str, text: &str) -> String {
        if is_template(text) {
            return text.to_string();
        }

        let document = Html::parse_document(text);
        self.selector_for(name)
            .and_then(|selector| Selector::parse(selector).ok())
            .and_then(|selector| document.select(&selector).next().map(|el| el.html()))
            .unwrap_or_else(|| body_markup(&document))
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::empty()
            .with_rule("header", "nav")
            .with_rule("footer", ".footer")
            .with_rule("anime-card", ".anime-card")
            .with_rule("genre-card", ".genre-card")
            .with_rule("recommendation-card", ".recommendation-card")
    }
}

fn body_markup(document: &Html) -> String {
    Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .map(|body| body.inner_html())
        .unwrap_or_else(|| document.root_element().inner_html())
}
