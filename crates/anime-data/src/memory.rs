//! Scripted in-memory network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use anime_core::{Request, Response};
use async_trait::async_trait;

use crate::client::{FetchError, Network};

/// In-memory network keyed by exact request URL.
///
/// Unknown URLs answer 404. While offline every fetch fails with
/// [`FetchError::Connection`]. Every call is counted and recorded, offline
/// or not.
#[derive(Debug)]
pub struct MemoryNetwork {
    routes: RwLock<HashMap<String, Response>>,
    online: AtomicBool,
    calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl MemoryNetwork {
    /// Create an empty, online network.
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a route.
    pub fn with_route(self, url: impl Into<String>, response: Response) -> Self {
        self.insert(url, response);
        self
    }

    /// Add or replace a route.
    pub fn insert(&self, url: impl Into<String>, response: Response) {
        self.routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into(), response);
    }

    /// Remove a route.
    pub fn remove(&self, url: &str) {
        self.routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(url);
    }

    /// Switch the network on or off.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of fetches attempted.
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs fetched, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of fetches for one URL.
    pub fn count_for(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| *u == url).count()
    }
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for MemoryNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.url.clone());

        if !self.online.load(Ordering::SeqCst) {
            return Err(FetchError::Connection(format!(
                "network unreachable: {}",
                request.url
            )));
        }

        let routes = self.routes.read().unwrap_or_else(|e| e.into_inner());
        Ok(routes
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "Not Found")))
    }
}
