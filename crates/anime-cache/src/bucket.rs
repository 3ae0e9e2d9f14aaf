//! Version-qualified bucket naming.

use std::fmt;

use anime_core::{RequestClassification, WorkerConfig};
use serde::{Deserialize, Serialize};

/// The three partitions of the cache store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKind {
    /// Pre-cached site shell.
    Static,
    /// Data files and everything fetched network-first.
    Dynamic,
    /// Images.
    Image,
}

impl BucketKind {
    /// All kinds.
    pub const ALL: [BucketKind; 3] = [BucketKind::Static, BucketKind::Dynamic, BucketKind::Image];

    /// The bucket that stores responses for a classification.
    pub fn for_classification(class: RequestClassification) -> Self {
        match class {
            RequestClassification::Static => Self::Static,
            RequestClassification::Image => Self::Image,
            RequestClassification::Data | RequestClassification::Dynamic => Self::Dynamic,
        }
    }

    /// Lowercase name used inside bucket names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current version's bucket names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet {
    static_name: String,
    dynamic_name: String,
    image_name: String,
}

impl BucketSet {
    /// Build names of the form `<prefix>-<kind>-<version>`.
    pub fn new(prefix: &str, version: &str) -> Self {
        let name = |kind: BucketKind| format!("{}-{}-{}", prefix, kind, version);
        Self {
            static_name: name(BucketKind::Static),
            dynamic_name: name(BucketKind::Dynamic),
            image_name: name(BucketKind::Image),
        }
    }

    /// Build from worker configuration.
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(&config.app_prefix, &config.version)
    }

    /// Name of a bucket.
    pub fn name(&self, kind: BucketKind) -> &str {
        match kind {
            BucketKind::Static => &self.static_name,
            BucketKind::Dynamic => &self.dynamic_name,
            BucketKind::Image => &self.image_name,
        }
    }

    /// All three current names.
    pub fn names(&self) -> [&str; 3] {
        [&self.static_name, &self.dynamic_name, &self.image_name]
    }

    /// Whether a bucket name belongs to the current version.
    pub fn is_current(&self, name: &str) -> bool {
        self.names().contains(&name)
    }

    /// Names from `existing` that are not current and must be purged.
    pub fn stale<'a>(&self, existing: &'a [String]) -> Vec<&'a str> {
        existing
            .iter()
            .map(String::as_str)
            .filter(|name| !self.is_current(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names() {
        let set = BucketSet::new("startanime", "v1.0.0");
        assert_eq!(set.name(BucketKind::Static), "startanime-static-v1.0.0");
        assert_eq!(set.name(BucketKind::Dynamic), "startanime-dynamic-v1.0.0");
        assert_eq!(set.name(BucketKind::Image), "startanime-image-v1.0.0");
    }

    #[test]
    fn test_from_default_config() {
        let set = BucketSet::from_config(&WorkerConfig::default());
        assert!(set.is_current("startanime-image-v1.0.0"));
    }

    #[test]
    fn test_stale_buckets() {
        let set = BucketSet::new("startanime", "v1.0.0");
        let existing = vec![
            "startanime-static-v1.0.0".to_string(),
            "startanime-static-v0.9.0".to_string(),
            "other-app-cache".to_string(),
        ];

        assert_eq!(
            set.stale(&existing),
            vec!["startanime-static-v0.9.0", "other-app-cache"]
        );
    }

    #[test]
    fn test_classification_to_bucket() {
        assert_eq!(
            BucketKind::for_classification(RequestClassification::Static),
            BucketKind::Static
        );
        assert_eq!(
            BucketKind::for_classification(RequestClassification::Image),
            BucketKind::Image
        );
        assert_eq!(
            BucketKind::for_classification(RequestClassification::Data),
            BucketKind::Dynamic
        );
        assert_eq!(
            BucketKind::for_classification(RequestClassification::Dynamic),
            BucketKind::Dynamic
        );
    }
}
