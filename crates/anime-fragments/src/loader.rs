//! Loading, memoizing and rendering named fragments.

use std::collections::HashMap;
use std::sync::Arc;

use anime_core::Request;
use anime_data::{fetch_ok, FetchError, Network};
use anime_observability::StructuredLogger;
use futures::future::join_all;
use tokio::sync::{broadcast, RwLock};

use crate::error::{FragmentError, FragmentLoadError};
use crate::extract::ExtractionRules;
use crate::mount::{ComponentLoaded, ComponentNode, MountPoint};
use crate::template::{render_template, TemplateData};

/// Default location of component files.
pub const DEFAULT_COMPONENTS_BASE: &str = "./components";

/// Outcome of [`FragmentLoader::preload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Fragments now in the memo.
    pub loaded: Vec<String>,
    /// Fragments that could not be loaded.
    pub failed: Vec<FragmentLoadError>,
}

/// Loads HTML component fragments and injects them into mount points.
///
/// Each fragment is fetched once. The first extracted markup stored for a
/// name is kept until [`clear_cache`](Self::clear_cache).
pub struct FragmentLoader {
    network: Arc<dyn Network>,
    base: String,
    rules: ExtractionRules,
    memo: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<ComponentLoaded>,
    logger: StructuredLogger,
}

impl FragmentLoader {
    /// Create a loader reading components from [`DEFAULT_COMPONENTS_BASE`].
    pub fn new(network: Arc<dyn Network>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            network,
            base: DEFAULT_COMPONENTS_BASE.to_string(),
            rules: ExtractionRules::default(),
            memo: RwLock::new(HashMap::new()),
            events,
            logger: StructuredLogger::new("fragments"),
        }
    }

    /// Read components from another directory.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the extraction rules.
    pub fn with_rules(mut self, rules: ExtractionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Receive an event for every successful injection.
    pub fn subscribe(&self) -> broadcast::Receiver<ComponentLoaded> {
        self.events.subscribe()
    }

    /// URLs tried for `name`, in order.
    pub fn probe_urls(&self, name: &str) -> [String; 2] {
        [
            format!("{}/{}-template.html", self.base, name),
            format!("{}/{}.html", self.base, name),
        ]
    }

    /// Markup for `name`, fetching and extracting it on first use.
    pub async fn load_fragment(&self, name: &str) -> Result<String, FragmentLoadError> {
        if let Some(markup) = self.memo.read().await.get(name) {
            return Ok(markup.clone());
        }

        let text = self.fetch_source(name).await?;
        let markup = self.rules.extract(name, &text);

        let mut memo = self.memo.write().await;
        let stored = memo.entry(name.to_string()).or_insert(markup);
        self.logger
            .debug_builder("fragment cached")
            .field("name", name)
            .field_u64("bytes", stored.len() as u64)
            .emit();
        Ok(stored.clone())
    }

    async fn fetch_source(&self, name: &str) -> Result<String, FragmentLoadError> {
        let mut last_error = FetchError::InvalidUrl(name.to_string());
        for url in self.probe_urls(name) {
            match fetch_ok(self.network.as_ref(), &Request::get(url.as_str())).await {
                Ok(response) => return Ok(response.text()),
                Err(e) => {
                    self.logger
                        .debug_builder("probe failed")
                        .field("url", url.as_str())
                        .field("error", e.to_string())
                        .emit();
                    last_error = e;
                }
            }
        }
        Err(FragmentLoadError {
            name: name.to_string(),
            cause: last_error,
        })
    }

    /// Load `name` and substitute `data` into it.
    pub async fn render(
        &self,
        name: &str,
        data: Option<&TemplateData>,
    ) -> Result<String, FragmentLoadError> {
        let markup = self.load_fragment(name).await?;
        Ok(match data {
            Some(data) => render_template(&markup, data),
            None => markup,
        })
    }

    /// Decode template data from JSON text. Malformed text yields empty
    /// data, so placeholders render as written.
    pub fn parse_data(&self, text: &str) -> TemplateData {
        TemplateData::from_json(text).unwrap_or_else(|e| {
            self.logger
                .warn_builder("invalid template data")
                .field("error", e.to_string())
                .emit();
            TemplateData::new()
        })
    }

    /// Render `name` into `target`. On failure the target shows an inline
    /// error instead. Returns whether the component was mounted.
    pub async fn inject_component(
        &self,
        name: &str,
        target: &mut MountPoint,
        data: Option<&TemplateData>,
    ) -> bool {
        match self.render(name, data).await {
            Ok(markup) => {
                target.mount(markup);
                // Nobody listening is fine.
                let _ = self.events.send(ComponentLoaded {
                    name: name.to_string(),
                    target: target.id().to_string(),
                });
                true
            }
            Err(e) => {
                self.logger
                    .error_builder("component failed")
                    .field("name", name)
                    .field("target", target.id())
                    .field("error", e.to_string())
                    .emit();
                target.show_error(name);
                false
            }
        }
    }

    /// Render `name` and return its root element, detached from any page.
    pub async fn create_component(
        &self,
        name: &str,
        data: Option<&TemplateData>,
    ) -> Result<ComponentNode, FragmentError> {
        let markup = self.render(name, data).await?;
        ComponentNode::parse(&markup).ok_or_else(|| FragmentError::NoElement {
            name: name.to_string(),
        })
    }

    /// Load several fragments concurrently.
    pub async fn preload(&self, names: &[&str]) -> PreloadReport {
        let results = join_all(names.iter().map(|name| self.load_fragment(name))).await;

        let mut report = PreloadReport::default();
        for (name, result) in names.iter().zip(results) {
            match result {
                Ok(_) => report.loaded.push(name.to_string()),
                Err(e) => report.failed.push(e),
            }
        }
        report
    }

    /// Whether `name` is memoized.
    pub async fn is_cached(&self, name: &str) -> bool {
        self.memo.read().await.contains_key(name)
    }

    /// Drop every memoized fragment.
    pub async fn clear_cache(&self) {
        self.memo.write().await.clear();
        self.logger.debug("fragment cache cleared");
    }
}
