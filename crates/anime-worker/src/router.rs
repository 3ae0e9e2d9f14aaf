//! Request routing across buckets, network and offline fallbacks.

use std::sync::Arc;

use anime_cache::{BucketKind, BucketSet, CacheStatus, CacheStorage, RequestKey, StoredResponse};
use anime_core::{Request, RequestClassification, Response, Strategy, WorkerConfig};
use anime_data::{FetchError, Network};
use anime_observability::StructuredLogger;

use crate::classify::RequestClassifier;
use crate::fallback::{generated_placeholder, offline_json, OfflineFallback};

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// Response handed back to the page.
    pub response: Response,
    /// Where the response came from.
    pub status: CacheStatus,
    /// Classification, or `None` for bypassed requests.
    pub classification: Option<RequestClassification>,
}

impl Routed {
    fn new(response: Response, status: CacheStatus, class: RequestClassification) -> Self {
        Self {
            response,
            status,
            classification: Some(class),
        }
    }
}

/// Why the network could not satisfy a request.
enum NetworkFailure {
    /// The server answered with a non-success status.
    Status(Response),
    /// The request never completed.
    Transport(FetchError),
}

impl NetworkFailure {
    fn into_routed(self, class: RequestClassification) -> Result<Routed, FetchError> {
        match self {
            Self::Status(response) => Ok(Routed::new(response, CacheStatus::Miss, class)),
            Self::Transport(error) => Err(error),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Status(response) => format!("status {}", response.status),
            Self::Transport(error) => error.to_string(),
        }
    }
}

/// Intercepts page requests and answers them from the cache, the network,
/// or an offline fallback.
///
/// Only GET requests are routed. Anything else goes straight to the network
/// and is never stored.
pub struct CacheRouter {
    config: Arc<WorkerConfig>,
    classifier: RequestClassifier,
    buckets: BucketSet,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    logger: StructuredLogger,
}

impl CacheRouter {
    /// Create a router with the default classification table.
    pub fn new(
        config: Arc<WorkerConfig>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        let buckets = BucketSet::from_config(&config);
        let logger = StructuredLogger::new("router").with_version(config.version.clone());
        Self {
            config,
            classifier: RequestClassifier::default(),
            buckets,
            storage,
            network,
            logger,
        }
    }

    /// Replace the classification table.
    pub fn with_classifier(mut self, classifier: RequestClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Bucket names this router reads and writes.
    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    /// The classification table.
    pub fn classifier(&self) -> &RequestClassifier {
        &self.classifier
    }

    /// Route a request.
    ///
    /// Transport failures with no applicable fallback are returned as
    /// errors. A non-success response with no fallback is passed through
    /// unchanged and not stored.
    pub async fn handle(&self, request: &Request) -> Result<Routed, FetchError> {
        if !request.is_get() {
            self.logger
                .debug_builder("bypass")
                .field("method", request.method.as_str())
                .field("url", request.url.as_str())
                .emit();
            let response = self.network.fetch(request).await?;
            return Ok(Routed {
                response,
                status: CacheStatus::Bypass,
                classification: None,
            });
        }

        let class = self.classifier.classify(request);
        let routed = match self.config.strategies.strategy_for(class) {
            Strategy::CacheFirst => self.cache_first(request, class).await,
            Strategy::NetworkFirst => self.network_first(request, class).await,
        };

        if let Ok(routed) = &routed {
            self.logger
                .debug_builder("routed")
                .field("url", request.url.as_str())
                .field("class", class.as_str())
                .field("cache", routed.status.to_string())
                .field_u64("status", u64::from(routed.response.status))
                .emit();
        }
        routed
    }

    async fn cache_first(
        &self,
        request: &Request,
        class: RequestClassification,
    ) -> Result<Routed, FetchError> {
        let key = RequestKey::from(request);
        if let Some(hit) = self.lookup(class, &key).await {
            return Ok(Routed::new(hit, CacheStatus::Hit, class));
        }

        match self.try_network(request).await {
            Ok(response) => {
                self.store(class, key, &response).await;
                Ok(Routed::new(response, CacheStatus::Miss, class))
            }
            Err(failure) => self.recover(request, class, failure).await,
        }
    }

    async fn network_first(
        &self,
        request: &Request,
        class: RequestClassification,
    ) -> Result<Routed, FetchError> {
        let key = RequestKey::from(request);
        match self.try_network(request).await {
            Ok(response) => {
                self.store(class, key, &response).await;
                Ok(Routed::new(response, CacheStatus::Miss, class))
            }
            Err(failure) => {
                if let Some(cached) = self.lookup(class, &key).await {
                    self.logger
                        .info_builder("serving cached copy")
                        .field("url", request.url.as_str())
                        .field("reason", failure.describe())
                        .emit();
                    return Ok(Routed::new(cached, CacheStatus::Fallback, class));
                }
                self.recover(request, class, failure).await
            }
        }
    }

    async fn try_network(&self, request: &Request) -> Result<Response, NetworkFailure> {
        match self.network.fetch(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(NetworkFailure::Status(response)),
            Err(error) => Err(NetworkFailure::Transport(error)),
        }
    }

    async fn recover(
        &self,
        request: &Request,
        class: RequestClassification,
        failure: NetworkFailure,
    ) -> Result<Routed, FetchError> {
        let fallback = OfflineFallback::for_request(&self.config, class, request);
        if fallback.is_none() {
            self.logger
                .warn_builder("network failed")
                .field("url", request.url.as_str())
                .field("reason", failure.describe())
                .emit();
            return failure.into_routed(class);
        }

        let response = match &fallback {
            OfflineFallback::OfflinePage(page) => {
                match self.get(BucketKind::Static, &RequestKey::get(page.as_str())).await {
                    Some(response) => response,
                    None => return failure.into_routed(class),
                }
            }
            OfflineFallback::PlaceholderImage(image) => self
                .lookup(class, &RequestKey::get(image.as_str()))
                .await
                .unwrap_or_else(generated_placeholder),
            OfflineFallback::OfflineJson => offline_json(),
            OfflineFallback::None => return failure.into_routed(class),
        };

        self.logger
            .info_builder("serving offline fallback")
            .field("url", request.url.as_str())
            .field("class", class.as_str())
            .field("reason", failure.describe())
            .emit();
        Ok(Routed::new(response, CacheStatus::Fallback, class))
    }

    /// Look in the classification's bucket, then in the pre-cache bucket.
    async fn lookup(&self, class: RequestClassification, key: &RequestKey) -> Option<Response> {
        let primary = BucketKind::for_classification(class);
        if let Some(response) = self.get(primary, key).await {
            return Some(response);
        }
        if primary == BucketKind::Static {
            return None;
        }
        self.get(BucketKind::Static, key).await
    }

    async fn get(&self, kind: BucketKind, key: &RequestKey) -> Option<Response> {
        let bucket = self.buckets.name(kind);
        match self.storage.get(bucket, key).await {
            Ok(entry) => entry.map(|stored| stored.to_response()),
            Err(e) => {
                self.logger
                    .warn_builder("cache read failed")
                    .field("bucket", bucket)
                    .field("key", key.to_string())
                    .field("error", e.to_string())
                    .emit();
                None
            }
        }
    }

    async fn store(&self, class: RequestClassification, key: RequestKey, response: &Response) {
        let bucket = self.buckets.name(BucketKind::for_classification(class));
        let label = key.to_string();
        if let Err(e) = self
            .storage
            .put(bucket, key, StoredResponse::from_response(response))
            .await
        {
            self.logger
                .warn_builder("cache write failed")
                .field("bucket", bucket)
                .field("key", label)
                .field("error", e.to_string())
                .emit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anime_cache::MemoryCacheStorage;
    use anime_data::MemoryNetwork;
    use http::Method;

    struct Fixture {
        router: CacheRouter,
        storage: Arc<MemoryCacheStorage>,
        network: Arc<MemoryNetwork>,
        buckets: BucketSet,
    }

    fn fixture(network: MemoryNetwork) -> Fixture {
        let config = Arc::new(WorkerConfig::default());
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(network);
        let router = CacheRouter::new(config.clone(), storage.clone(), network.clone());
        Fixture {
            router,
            storage,
            network,
            buckets: BucketSet::from_config(&config),
        }
    }

    async fn seed(storage: &MemoryCacheStorage, bucket: &str, url: &str, body: &str) {
        storage
            .put(
                bucket,
                RequestKey::get(url),
                StoredResponse::from_response(&Response::ok(body)),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_static_hit_makes_no_network_call() {
        let f = fixture(MemoryNetwork::new());
        let bucket = f.buckets.name(BucketKind::Static).to_string();
        seed(&f.storage, &bucket, "/css/main.css", "body{}").await;

        let routed = f.router.handle(&Request::get("/css/main.css")).await.unwrap();

        assert_eq!(routed.status, CacheStatus::Hit);
        assert_eq!(routed.response.text(), "body{}");
        assert_eq!(routed.classification, Some(RequestClassification::Static));
        assert_eq!(f.network.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_image_miss_writes_through() {
        let f = fixture(
            MemoryNetwork::new().with_route("/images/naruto.jpg", Response::ok("jpeg-bytes")),
        );

        let routed = f
            .router
            .handle(&Request::get("/images/naruto.jpg"))
            .await
            .unwrap();
        assert_eq!(routed.status, CacheStatus::Miss);
        assert_eq!(routed.response.text(), "jpeg-bytes");

        let stored = f
            .storage
            .get(
                f.buckets.name(BucketKind::Image),
                &RequestKey::get("/images/naruto.jpg"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, b"jpeg-bytes");

        let again = f
            .router
            .handle(&Request::get("/images/naruto.jpg"))
            .await
            .unwrap();
        assert_eq!(again.status, CacheStatus::Hit);
        assert_eq!(f.network.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_dynamic_network_first_refreshes_cache() {
        let f = fixture(MemoryNetwork::new().with_route("/api/trending", Response::ok("fresh")));
        let bucket = f.buckets.name(BucketKind::Dynamic).to_string();
        seed(&f.storage, &bucket, "/api/trending", "stale").await;

        let routed = f.router.handle(&Request::get("/api/trending")).await.unwrap();
        assert_eq!(routed.status, CacheStatus::Miss);
        assert_eq!(routed.response.text(), "fresh");

        let stored = f
            .storage
            .get(&bucket, &RequestKey::get("/api/trending"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, b"fresh");
    }

    #[tokio::test]
    async fn test_dynamic_offline_serves_cached_copy() {
        let f = fixture(MemoryNetwork::new());
        let bucket = f.buckets.name(BucketKind::Dynamic).to_string();
        seed(&f.storage, &bucket, "/api/trending", "cached").await;
        f.network.set_online(false);

        let routed = f.router.handle(&Request::get("/api/trending")).await.unwrap();
        assert_eq!(routed.status, CacheStatus::Fallback);
        assert_eq!(routed.response.text(), "cached");
    }

    #[tokio::test]
    async fn test_dynamic_offline_without_copy_is_error() {
        let f = fixture(MemoryNetwork::new());
        f.network.set_online(false);

        let err = f
            .router
            .handle(&Request::get("/api/trending"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connection(_)));
    }

    #[tokio::test]
    async fn test_root_offline_falls_back_to_precache() {
        let f = fixture(MemoryNetwork::new());
        let bucket = f.buckets.name(BucketKind::Static).to_string();
        seed(&f.storage, &bucket, "/", "<html>home</html>").await;
        f.network.set_online(false);

        let routed = f.router.handle(&Request::get("/")).await.unwrap();
        assert_eq!(routed.status, CacheStatus::Fallback);
        assert_eq!(routed.response.text(), "<html>home</html>");
    }

    #[tokio::test]
    async fn test_data_offline_returns_json_error() {
        let f = fixture(MemoryNetwork::new());
        f.network.set_online(false);

        let routed = f
            .router
            .handle(&Request::get("/data/anime-list.json"))
            .await
            .unwrap();
        assert_eq!(routed.status, CacheStatus::Fallback);
        assert_eq!(routed.response.content_type(), Some("application/json"));

        let body: serde_json::Value = routed.response.json_body().unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Data unavailable offline" }));
    }

    #[tokio::test]
    async fn test_data_hit_from_dynamic_bucket() {
        let f = fixture(MemoryNetwork::new());
        let bucket = f.buckets.name(BucketKind::Dynamic).to_string();
        seed(&f.storage, &bucket, "/data/genres.json", "[]").await;

        let routed = f
            .router
            .handle(&Request::get("/data/genres.json"))
            .await
            .unwrap();
        assert_eq!(routed.status, CacheStatus::Hit);
        assert_eq!(routed.classification, Some(RequestClassification::Data));
        assert_eq!(routed.response.text(), "[]");
        assert_eq!(f.network.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_html_offline_serves_offline_page() {
        let f = fixture(MemoryNetwork::new());
        let bucket = f.buckets.name(BucketKind::Static).to_string();
        seed(&f.storage, &bucket, "/offline.html", "<h1>Offline</h1>").await;
        f.network.set_online(false);

        let routed = f.router.handle(&Request::get("/anime.html")).await.unwrap();
        assert_eq!(routed.status, CacheStatus::Fallback);
        assert_eq!(routed.response.text(), "<h1>Offline</h1>");
    }

    #[tokio::test]
    async fn test_static_asset_failure_propagates() {
        let f = fixture(MemoryNetwork::new());
        f.network.set_online(false);

        let result = f.router.handle(&Request::get("/js/extra.js")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_not_found_passes_through_unstored() {
        let f = fixture(MemoryNetwork::new());

        let routed = f.router.handle(&Request::get("/js/missing.js")).await.unwrap();
        assert_eq!(routed.response.status, 404);
        assert_eq!(routed.status, CacheStatus::Miss);

        let keys = f
            .storage
            .keys(f.buckets.name(BucketKind::Static))
            .await
            .unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_image_offline_uses_cached_placeholder() {
        let f = fixture(MemoryNetwork::new());
        let bucket = f.buckets.name(BucketKind::Image).to_string();
        seed(&f.storage, &bucket, "/assets/images/placeholder.webp", "webp").await;
        f.network.set_online(false);

        let routed = f
            .router
            .handle(&Request::get("/images/missing.png"))
            .await
            .unwrap();
        assert_eq!(routed.status, CacheStatus::Fallback);
        assert_eq!(routed.response.text(), "webp");
    }

    #[tokio::test]
    async fn test_image_offline_generates_placeholder() {
        let f = fixture(MemoryNetwork::new());
        f.network.set_online(false);

        let routed = f
            .router
            .handle(&Request::get("/images/missing.png"))
            .await
            .unwrap();
        assert_eq!(routed.status, CacheStatus::Fallback);
        assert!(routed.response.is_success());
        assert_eq!(routed.response.content_type(), Some("image/svg+xml"));
    }

    #[tokio::test]
    async fn test_post_bypasses_cache() {
        let f = fixture(MemoryNetwork::new().with_route("/api/rate", Response::ok("ok")));

        let routed = f
            .router
            .handle(&Request::new(Method::POST, "/api/rate"))
            .await
            .unwrap();
        assert_eq!(routed.status, CacheStatus::Bypass);
        assert_eq!(routed.classification, None);
        assert_eq!(f.network.fetch_count(), 1);

        let buckets = f.storage.buckets().await.unwrap();
        assert!(buckets.is_empty());
    }
}
