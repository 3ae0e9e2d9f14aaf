//! Cache storage backend trait and the in-memory backend.

use std::collections::{BTreeMap, HashMap};

use anime_core::{Headers, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::key::RequestKey;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to serialize/deserialize a bucket.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend storage error.
    #[error("storage error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A response as kept in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Response body.
    #[serde(with = "body_base64")]
    pub body: Vec<u8>,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Snapshot a response.
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            stored_at: Utc::now(),
        }
    }

    /// Rebuild a response.
    pub fn to_response(&self) -> Response {
        Response {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    /// Age in seconds.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.stored_at).num_seconds().max(0)
    }
}

impl From<&Response> for StoredResponse {
    fn from(response: &Response) -> Self {
        Self::from_response(response)
    }
}

mod body_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Named-bucket cache storage.
///
/// Every call is atomic with respect to other calls on the same storage.
/// Writing into a bucket that does not exist creates it.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create a bucket if it does not exist.
    async fn open(&self, bucket: &str) -> CacheResult<()>;

    /// Check whether a bucket exists.
    async fn has(&self, bucket: &str) -> CacheResult<bool>;

    /// Names of all existing buckets.
    async fn buckets(&self) -> CacheResult<Vec<String>>;

    /// Delete a bucket. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> CacheResult<bool>;

    /// Look up an entry.
    async fn get(&self, bucket: &str, key: &RequestKey) -> CacheResult<Option<StoredResponse>>;

    /// Store an entry, replacing any previous one.
    async fn put(&self, bucket: &str, key: RequestKey, response: StoredResponse) -> CacheResult<()>;

    /// Store several entries at once.
    async fn put_all(
        &self,
        bucket: &str,
        entries: Vec<(RequestKey, StoredResponse)>,
    ) -> CacheResult<()>;

    /// Keys stored in a bucket.
    async fn keys(&self, bucket: &str) -> CacheResult<Vec<RequestKey>>;
}

type Bucket = HashMap<RequestKey, StoredResponse>;

/// In-memory cache storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    buckets: RwLock<BTreeMap<String, Bucket>>,
}

impl MemoryCacheStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with buckets.
    pub(crate) fn with_buckets(buckets: BTreeMap<String, Bucket>) -> Self {
        Self {
            buckets: RwLock::new(buckets),
        }
    }

    /// Copy of one bucket's entries, sorted by key.
    pub(crate) async fn snapshot(&self, bucket: &str) -> Option<Vec<(RequestKey, StoredResponse)>> {
        let buckets = self.buckets.read().await;
        let entries = buckets.get(bucket)?;
        let mut entries: Vec<_> = entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Some(entries)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, bucket: &str) -> CacheResult<()> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn has(&self, bucket: &str) -> CacheResult<bool> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn buckets(&self) -> CacheResult<Vec<String>> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }

    async fn delete(&self, bucket: &str) -> CacheResult<bool> {
        Ok(self.buckets.write().await.remove(bucket).is_some())
    }

    async fn get(&self, bucket: &str, key: &RequestKey) -> CacheResult<Option<StoredResponse>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(bucket)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, bucket: &str, key: RequestKey, response: StoredResponse) -> CacheResult<()> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(key, response);
        Ok(())
    }

    async fn put_all(
        &self,
        bucket: &str,
        entries: Vec<(RequestKey, StoredResponse)>,
    ) -> CacheResult<()> {
        let mut buckets = self.buckets.write().await;
        let target = buckets.entry(bucket.to_string()).or_default();
        target.extend(entries);
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> CacheResult<Vec<RequestKey>> {
        let buckets = self.buckets.read().await;
        let mut keys: Vec<RequestKey> = buckets
            .get(bucket)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }
}
