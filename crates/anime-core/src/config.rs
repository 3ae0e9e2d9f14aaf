//! Worker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classification::StrategyTable;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the worker needs to know at startup.
///
/// Bucket names are derived from `app_prefix` and `version`, e.g.
/// `startanime-static-v1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Prefix shared by every bucket this worker owns.
    pub app_prefix: String,
    /// Version qualifier for bucket names.
    pub version: String,
    /// URLs pre-cached into the static bucket at install time.
    pub manifest: Vec<String>,
    /// Page served when an HTML request fails offline.
    pub offline_page: String,
    /// Image served when an image request fails offline.
    pub placeholder_image: String,
    /// Page opened by the `explore` notification action.
    pub recommendations_page: String,
    /// Notification content.
    pub notification: NotificationConfig,
    /// Strategy per request classification.
    pub strategies: StrategyTable,
}

impl WorkerConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|e| e == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            app_prefix: "startanime".to_string(),
            version: "v1.0.0".to_string(),
            manifest: default_manifest(),
            offline_page: "/offline.html".to_string(),
            placeholder_image: "/assets/images/placeholder.webp".to_string(),
            recommendations_page: "/recommendations.html".to_string(),
            notification: NotificationConfig::default(),
            strategies: StrategyTable::default(),
        }
    }
}

/// Static manifest shipped with the site.
pub fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/anime.html",
        "/genres.html",
        "/recommendations.html",
        "/about.html",
        "/offline.html",
        "/css/main.css",
        "/css/components.css",
        "/css/animations.css",
        "/js/main.js",
        "/js/components.js",
        "/js/recommendations.js",
        "/assets/fonts/inter-var.woff2",
        "/assets/icons/logo.svg",
        "/assets/icons/icon-192x192.png",
        "/assets/icons/icon-512x512.png",
        "/manifest.json",
        "/data/anime-list.json",
        "/data/genres.json",
        "/data/recommendations.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Content of the push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub explore_title: String,
    pub close_title: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "StartAnime".to_string(),
            body: "New anime recommendations are waiting for you!".to_string(),
            icon: "/assets/icons/icon-192x192.png".to_string(),
            badge: "/assets/icons/icon-72x72.png".to_string(),
            explore_title: "Explore".to_string(),
            close_title: "Close".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Strategy;

    #[test]
    fn test_default_manifest_has_data_fixtures() {
        let config = WorkerConfig::default();
        for fixture in [
            "/data/anime-list.json",
            "/data/genres.json",
            "/data/recommendations.json",
        ] {
            assert!(config.manifest.iter().any(|u| u == fixture));
        }
        assert!(config.manifest.contains(&config.offline_page));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = WorkerConfig::from_toml_str(
            r#"
version = "v2.0.0"
manifest = ["/", "/offline.html"]

[strategies]
data = "network-first"
"#,
        )
        .unwrap();

        assert_eq!(config.version, "v2.0.0");
        assert_eq!(config.app_prefix, "startanime");
        assert_eq!(config.manifest.len(), 2);
        assert_eq!(config.strategies.data, Strategy::NetworkFirst);
        assert_eq!(config.notification, NotificationConfig::default());
    }

    #[test]
    fn test_json_config() {
        let config = WorkerConfig::from_json_str(r#"{"app_prefix": "demo"}"#).unwrap();
        assert_eq!(config.app_prefix, "demo");
        assert_eq!(config.version, "v1.0.0");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            WorkerConfig::from_toml_str("version = ["),
            Err(ConfigError::Toml(_))
        ));
    }
}
