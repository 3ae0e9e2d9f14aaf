//! File-backed cache storage.
//!
//! Each bucket is a JSON file under the storage root. The whole bucket is
//! held in memory and rewritten on every mutation, so entries survive a
//! process restart until their bucket is deleted.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::key::RequestKey;
use crate::store::{CacheError, CacheResult, CacheStorage, MemoryCacheStorage, StoredResponse};

/// On-disk bucket format.
#[derive(Debug, Serialize, Deserialize)]
struct BucketFile {
    name: String,
    entries: Vec<BucketFileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BucketFileEntry {
    key: RequestKey,
    response: StoredResponse,
}

/// Cache storage persisted to a directory.
#[derive(Debug)]
pub struct FsCacheStorage {
    root: PathBuf,
    inner: MemoryCacheStorage,
    /// Serializes snapshot-and-write so files never regress.
    write_lock: Mutex<()>,
}

impl FsCacheStorage {
    /// Open a storage directory, loading every bucket file in it.
    pub async fn open_dir(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| io_error(&root, source))?;

        let mut buckets = BTreeMap::new();
        let mut dir = tokio::fs::read_dir(&root)
            .await
            .map_err(|source| io_error(&root, source))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|source| io_error(&root, source))?
        {
            let path = entry.path();
            if path.extension().map_or(true, |e| e != "json") {
                continue;
            }

            let content = tokio::fs::read(&path)
                .await
                .map_err(|source| io_error(&path, source))?;
            let file: BucketFile = serde_json::from_slice(&content)?;
            let entries: HashMap<_, _> = file
                .entries
                .into_iter()
                .map(|e| (e.key, e.response))
                .collect();
            buckets.insert(file.name, entries);
        }

        Ok(Self {
            root,
            inner: MemoryCacheStorage::with_buckets(buckets),
            write_lock: Mutex::new(()),
        })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `bucket`. Names are hex-encoded so distinct buckets
    /// never share a file, even on case-insensitive filesystems.
    fn bucket_path(&self, bucket: &str) -> PathBuf {
        let encoded: String = bucket.bytes().map(|b| format!("{:02x}", b)).collect();
        self.root.join(format!("bucket-{}.json", encoded))
    }

    async fn flush(&self, bucket: &str) -> CacheResult<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.bucket_path(bucket);
        let Some(entries) = self.inner.snapshot(bucket).await else {
            return remove_if_exists(&path).await;
        };

        let file = BucketFile {
            name: bucket.to_string(),
            entries: entries
                .into_iter()
                .map(|(key, response)| BucketFileEntry { key, response })
                .collect(),
        };
        let content = serde_json::to_vec(&file)?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(&path, source))
    }
}

#[async_trait]
impl CacheStorage for FsCacheStorage {
    async fn open(&self, bucket: &str) -> CacheResult<()> {
        if self.inner.has(bucket).await? {
            return Ok(());
        }
        self.inner.open(bucket).await?;
        self.flush(bucket).await
    }

    async fn has(&self, bucket: &str) -> CacheResult<bool> {
        self.inner.has(bucket).await
    }

    async fn buckets(&self) -> CacheResult<Vec<String>> {
        self.inner.buckets().await
    }

    async fn delete(&self, bucket: &str) -> CacheResult<bool> {
        if !self.inner.delete(bucket).await? {
            return Ok(false);
        }
        self.flush(bucket).await?;
        Ok(true)
    }

    async fn get(&self, bucket: &str, key: &RequestKey) -> CacheResult<Option<StoredResponse>> {
        self.inner.get(bucket, key).await
    }

    async fn put(&self, bucket: &str, key: RequestKey, response: StoredResponse) -> CacheResult<()> {
        self.inner.put(bucket, key, response).await?;
        self.flush(bucket).await
    }

    async fn put_all(
        &self,
        bucket: &str,
        entries: Vec<(RequestKey, StoredResponse)>,
    ) -> CacheResult<()> {
        self.inner.put_all(bucket, entries).await?;
        self.flush(bucket).await
    }

    async fn keys(&self, bucket: &str) -> CacheResult<Vec<RequestKey>> {
        self.inner.keys(bucket).await
    }
}

async fn remove_if_exists(path: &Path) -> CacheResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(io_error(path, source)),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anime_core::Response;

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = RequestKey::get("/data/genres.json");

        {
            let storage = FsCacheStorage::open_dir(dir.path()).await.unwrap();
            let response = Response::ok(r#"["action"]"#).with_header("content-type", "application/json");
            storage
                .put("startanime-dynamic-v1.0.0", key.clone(), StoredResponse::from(&response))
                .await
                .unwrap();
        }

        let reopened = FsCacheStorage::open_dir(dir.path()).await.unwrap();
        let hit = reopened
            .get("startanime-dynamic-v1.0.0", &key)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(hit.body, br#"["action"]"#);
        assert_eq!(hit.to_response().content_type(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsCacheStorage::open_dir(dir.path()).await.unwrap();

        let file = storage.bucket_path("startanime-static-v0.9.0");

        storage.open("startanime-static-v0.9.0").await.unwrap();
        assert!(file.exists());

        assert!(storage.delete("startanime-static-v0.9.0").await.unwrap());
        assert!(!file.exists());

        let reopened = FsCacheStorage::open_dir(dir.path()).await.unwrap();
        assert!(reopened.buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bucket_names_map_to_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsCacheStorage::open_dir(dir.path()).await.unwrap();

        let files = [
            storage.bucket_path("odd/name"),
            storage.bucket_path("odd_name"),
            storage.bucket_path("Odd_Name"),
        ];
        assert_ne!(files[0], files[1]);
        assert_ne!(
            files[1].to_string_lossy().to_lowercase(),
            files[2].to_string_lossy().to_lowercase()
        );

        storage.open("odd/name").await.unwrap();
        assert!(files[0].exists());
        assert_eq!(files[0].parent(), Some(dir.path()));

        let reopened = FsCacheStorage::open_dir(dir.path()).await.unwrap();
        assert_eq!(reopened.buckets().await.unwrap(), vec!["odd/name"]);
    }

    #[tokio::test]
    async fn test_deleting_missing_bucket_keeps_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let key = RequestKey::get("/api/top");

        {
            let storage = FsCacheStorage::open_dir(dir.path()).await.unwrap();
            storage
                .put("user_cache", key.clone(), StoredResponse::from(&Response::ok("top")))
                .await
                .unwrap();

            assert!(!storage.delete("user cache").await.unwrap());
            assert!(!storage.delete("user/cache").await.unwrap());
            assert!(storage.has("user_cache").await.unwrap());
        }

        let reopened = FsCacheStorage::open_dir(dir.path()).await.unwrap();
        assert!(reopened.has("user_cache").await.unwrap());
        assert!(reopened.get("user_cache", &key).await.unwrap().is_some());
    }
}
