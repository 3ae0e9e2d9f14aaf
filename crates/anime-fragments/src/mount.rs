//! Injection targets and detached component nodes.

use scraper::{ElementRef, Html};

/// Announced after a component is injected into a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLoaded {
    /// Component name.
    pub name: String,
    /// Id of the mount point that received it.
    pub target: String,
}

/// A page slot that receives component markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    id: String,
    inner_html: String,
    loaded: bool,
}

impl MountPoint {
    /// An empty slot.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inner_html: String::new(),
            loaded: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Whether a component was injected successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the contents with component markup.
    pub fn mount(&mut self, markup: impl Into<String>) {
        self.inner_html = markup.into();
        self.loaded = true;
    }

    /// Replace the contents with an inline error for `component`.
    pub fn show_error(&mut self, component: &str) {
        self.inner_html = error_marker(component);
        self.loaded = false;
    }
}

/// Markup shown in place of a component that failed to load.
pub fn error_marker(component: &str) -> String {
    format!(
        r#"<div class="component-error">Failed to load component: {}</div>"#,
        escape_html(component)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A component's root element, detached from any page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    /// Tag name of the root element.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Outer markup of the root element.
    pub html: String,
}

impl ComponentNode {
    /// The first element in `markup`, if any.
    pub fn parse(markup: &str) -> Option<Self> {
        let fragment = Html::parse_fragment(markup);
        let root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)?;

        Some(Self {
            tag: root.value().name().to_string(),
            attributes: root
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            html: root.html(),
        })
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_and_error() {
        let mut slot = MountPoint::new("footer-slot");
        assert!(!slot.is_loaded());

        slot.mount("<footer>x</footer>");
        assert!(slot.is_loaded());
        assert_eq!(slot.inner_html(), "<footer>x</footer>");

        slot.show_error("footer");
        assert!(!slot.is_loaded());
        assert!(slot.inner_html().contains("component-error"));
        assert!(slot.inner_html().contains("footer"));
    }

    #[test]
    fn test_error_marker_escapes_name() {
        let marker = error_marker("<script>");
        assert!(marker.contains("&lt;script&gt;"));
        assert!(!marker.contains("<script>"));
    }

    #[test]
    fn test_first_element_is_root() {
        let node = ComponentNode::parse(
            "\n  <article class=\"anime-card featured\" data-id=\"7\"><h3>Naruto</h3></article><p>after</p>",
        )
        .unwrap();

        assert_eq!(node.tag, "article");
        assert_eq!(node.attr("data-id"), Some("7"));
        assert!(node.has_class("anime-card"));
        assert!(node.has_class("featured"));
        assert!(node.html.contains("<h3>Naruto</h3>"));
        assert!(!node.html.contains("after"));
    }

    #[test]
    fn test_text_only_has_no_root() {
        assert!(ComponentNode::parse("just text").is_none());
    }
}
