//! Request classification and cache strategy selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of an intercepted request, derived from its URL suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClassification {
    /// Pages, stylesheets, scripts, fonts and vector icons.
    Static,
    /// Raster images.
    Image,
    /// JSON data files.
    Data,
    /// Everything else.
    Dynamic,
}

impl RequestClassification {
    /// All classifications, in table order.
    pub const ALL: [RequestClassification; 4] = [
        RequestClassification::Static,
        RequestClassification::Image,
        RequestClassification::Data,
        RequestClassification::Dynamic,
    ];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Image => "image",
            Self::Data => "data",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for RequestClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch strategy applied to a classified request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve from cache; on miss fetch, store, and fall back when offline.
    CacheFirst,
    /// Fetch first and write through; serve the cached copy when offline.
    NetworkFirst,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheFirst => write!(f, "cache-first"),
            Self::NetworkFirst => write!(f, "network-first"),
        }
    }
}

/// Strategy for each classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTable {
    #[serde(rename = "static", default = "cache_first")]
    pub static_assets: Strategy,
    #[serde(default = "cache_first")]
    pub image: Strategy,
    #[serde(default = "cache_first")]
    pub data: Strategy,
    #[serde(default = "network_first")]
    pub dynamic: Strategy,
}

fn cache_first() -> Strategy {
    Strategy::CacheFirst
}

fn network_first() -> Strategy {
    Strategy::NetworkFirst
}

impl StrategyTable {
    /// Look up the strategy for a classification.
    pub fn strategy_for(&self, class: RequestClassification) -> Strategy {
        match class {
            RequestClassification::Static => self.static_assets,
            RequestClassification::Image => self.image,
            RequestClassification::Data => self.data,
            RequestClassification::Dynamic => self.dynamic,
        }
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self {
            static_assets: Strategy::CacheFirst,
            image: Strategy::CacheFirst,
            data: Strategy::CacheFirst,
            dynamic: Strategy::NetworkFirst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategies() {
        let table = StrategyTable::default();
        assert_eq!(
            table.strategy_for(RequestClassification::Static),
            Strategy::CacheFirst
        );
        assert_eq!(
            table.strategy_for(RequestClassification::Image),
            Strategy::CacheFirst
        );
        assert_eq!(
            table.strategy_for(RequestClassification::Data),
            Strategy::CacheFirst
        );
        assert_eq!(
            table.strategy_for(RequestClassification::Dynamic),
            Strategy::NetworkFirst
        );
    }

    #[test]
    fn test_strategy_table_from_toml_fills_defaults() {
        let table: StrategyTable = toml::from_str(r#"data = "network-first""#).unwrap();
        assert_eq!(table.data, Strategy::NetworkFirst);
        assert_eq!(table.static_assets, Strategy::CacheFirst);
        assert_eq!(table.dynamic, Strategy::NetworkFirst);
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(RequestClassification::Image.to_string(), "image");
        assert_eq!(Strategy::NetworkFirst.to_string(), "network-first");
    }
}
