//! Cache store for the StartAnime offline worker.
//!
//! This crate provides:
//! - `BucketKind` / `BucketSet` - Version-qualified bucket naming
//! - `RequestKey` - Cache entry identity (method + URL)
//! - `StoredResponse` - Persistable response snapshot
//! - `CacheStorage` - Storage backend trait
//! - `MemoryCacheStorage` / `FsCacheStorage` - In-process and on-disk backends
//! - `CacheStatus` - How a routed response was produced
//!
//! # Example
//!
//! ```ignore
//! use anime_cache::{BucketKind, BucketSet, CacheStorage, MemoryCacheStorage, RequestKey};
//!
//! let buckets = BucketSet::new("startanime", "v1.0.0");
//! let storage = MemoryCacheStorage::new();
//!
//! storage.put(buckets.name(BucketKind::Static), key, stored).await?;
//! let hit = storage.get(buckets.name(BucketKind::Static), &key).await?;
//! ```

mod bucket;
mod fs;
mod key;
mod status;
mod store;

pub use bucket::*;
pub use fs::*;
pub use key::*;
pub use status::*;
pub use store::*;
