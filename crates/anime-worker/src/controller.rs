//! Worker lifecycle: install, activate, messages, push and sync.

use std::sync::{Arc, Mutex};

use anime_cache::{BucketKind, BucketSet, CacheStorage, RequestKey, StoredResponse};
use anime_core::{
    LifecycleError, LifecycleObserver, LifecycleState, Request, TimingContext, WorkerConfig,
};
use anime_data::{fetch_ok, FetchError, Network};
use anime_observability::StructuredLogger;
use futures::future::try_join_all;

use crate::error::{WorkerError, WorkerResult};
use crate::host::WorkerHost;
use crate::message::ClientMessage;
use crate::notification::{Notification, NotificationClick};
use crate::router::CacheRouter;
use crate::sync::PendingActions;

/// One worker version and its lifecycle.
///
/// A controller starts in [`LifecycleState::Installing`]. The host drives it
/// with [`install`](Self::install) and [`activate`](Self::activate); once
/// installed it answers requests through [`router`](Self::router) and
/// accepts client messages.
pub struct LifecycleController {
    config: Arc<WorkerConfig>,
    buckets: BucketSet,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    router: CacheRouter,
    state: Mutex<LifecycleState>,
    observers: Vec<Arc<dyn LifecycleObserver>>,
    pending: PendingActions,
    logger: StructuredLogger,
}

impl LifecycleController {
    /// Create a worker for `config`.
    pub fn new(
        config: Arc<WorkerConfig>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Self {
        let buckets = BucketSet::from_config(&config);
        let logger = StructuredLogger::new("worker").with_version(config.version.clone());
        let router = CacheRouter::new(config.clone(), storage.clone(), network.clone())
            .with_logger(logger.child("router"));

        Self {
            config,
            buckets,
            storage,
            network,
            host,
            router,
            state: Mutex::new(LifecycleState::Installing),
            observers: Vec::new(),
            pending: PendingActions::new(),
            logger,
        }
    }

    /// Replace the logger. The router logs under a child component.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.router = self.router.with_logger(logger.child("router"));
        self.logger = logger;
        self
    }

    /// Register a state-change observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Worker version.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Bucket names owned by this version.
    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    /// Request router for intercepted fetches.
    pub fn router(&self) -> &CacheRouter {
        &self.router
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, next: LifecycleState) -> Result<(), LifecycleError> {
        let from = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let from = *state;
            *state = from.transition(next)?;
            from
        };

        self.logger
            .debug_builder("state change")
            .field("from", from.to_string())
            .field("to", next.to_string())
            .emit();
        for observer in &self.observers {
            observer.on_transition(from, next);
        }
        Ok(())
    }

    /// Pre-cache the manifest into the static bucket.
    ///
    /// Nothing is stored unless every manifest URL fetched successfully. On
    /// success the worker is waiting and has asked the host to skip the
    /// wait; on failure it is redundant. Returns the number of entries
    /// cached.
    pub async fn install(&self) -> WorkerResult<usize> {
        let state = self.state();
        if state != LifecycleState::Installing {
            return Err(LifecycleError::InvalidTransition {
                from: state,
                to: LifecycleState::Waiting,
            }
            .into());
        }

        let mut timing = TimingContext::new();
        self.logger
            .info_builder("installing")
            .field("bucket", self.buckets.name(BucketKind::Static))
            .field_u64("manifest", self.config.manifest.len() as u64)
            .emit();

        let count = match self.precache().await {
            Ok(count) => count,
            Err(e) => {
                self.logger
                    .error_builder("install failed")
                    .field("error", e.to_string())
                    .emit();
                self.transition(LifecycleState::Redundant)?;
                return Err(e);
            }
        };
        timing.mark("precached");

        self.warm_placeholder().await;
        self.transition(LifecycleState::Waiting)?;
        self.host.skip_waiting().await;

        self.logger
            .info_builder("installed")
            .field_u64("cached", count as u64)
            .duration_ms("elapsed_ms", timing.elapsed())
            .emit();
        Ok(count)
    }

    async fn precache(&self) -> WorkerResult<usize> {
        let entries = self
            .fetch_all(&self.config.manifest)
            .await
            .map_err(|(url, source)| WorkerError::Install { url, source })?;

        let bucket = self.buckets.name(BucketKind::Static);
        let count = entries.len();
        self.storage.open(bucket).await?;
        self.storage.put_all(bucket, entries).await?;
        Ok(count)
    }

    /// Fetch every URL concurrently; the first failure aborts the batch.
    async fn fetch_all(
        &self,
        urls: &[String],
    ) -> Result<Vec<(RequestKey, StoredResponse)>, (String, FetchError)> {
        let network = self.network.as_ref();
        let fetches = urls.iter().map(|url| async move {
            let request = Request::get(url.as_str());
            match fetch_ok(network, &request).await {
                Ok(response) => Ok((RequestKey::from(&request), StoredResponse::from(&response))),
                Err(e) => Err((url.clone(), e)),
            }
        });
        try_join_all(fetches).await
    }

    async fn warm_placeholder(&self) {
        let request = Request::get(self.config.placeholder_image.as_str());
        let bucket = self.buckets.name(BucketKind::Image);

        let result = match fetch_ok(self.network.as_ref(), &request).await {
            Ok(response) => self
                .storage
                .put(
                    bucket,
                    RequestKey::from(&request),
                    StoredResponse::from(&response),
                )
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(reason) = result {
            self.logger
                .warn_builder("placeholder not cached")
                .field("url", request.url.as_str())
                .field("error", reason)
                .emit();
        }
    }

    /// Delete every bucket this version does not own, claim open pages and
    /// become active. Returns the deleted bucket names.
    pub async fn activate(&self) -> WorkerResult<Vec<String>> {
        self.transition(LifecycleState::Activating)?;

        let deleted = match self.purge_stale().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.logger
                    .error_builder("activate failed")
                    .field("error", e.to_string())
                    .emit();
                self.transition(LifecycleState::Redundant)?;
                return Err(e);
            }
        };

        let claimed = self.host.claim_clients().await;
        self.transition(LifecycleState::Active)?;

        self.logger
            .info_builder("activated")
            .field_u64("deleted", deleted.len() as u64)
            .field_u64("clients", claimed as u64)
            .emit();
        Ok(deleted)
    }

    async fn purge_stale(&self) -> WorkerResult<Vec<String>> {
        let existing = self.storage.buckets().await?;
        let stale: Vec<String> = self
            .buckets
            .stale(&existing)
            .into_iter()
            .map(String::from)
            .collect();

        for name in &stale {
            self.logger
                .info_builder("deleting old cache")
                .field("bucket", name.as_str())
                .emit();
            self.storage.delete(name).await?;
        }
        Ok(stale)
    }

    /// Mark a replaced version as redundant.
    pub fn retire(&self) -> WorkerResult<()> {
        if self.state().is_terminal() {
            return Ok(());
        }
        self.transition(LifecycleState::Redundant)?;
        Ok(())
    }

    /// Handle one client message.
    pub async fn handle_message(&self, message: ClientMessage) -> WorkerResult<()> {
        self.logger
            .debug_builder("message")
            .field("type", message.kind())
            .emit();

        match message {
            ClientMessage::SkipWaiting => {
                self.host.skip_waiting().await;
            }
            ClientMessage::CacheUrls { urls } => {
                let entries = self
                    .fetch_all(&urls)
                    .await
                    .map_err(|(url, source)| WorkerError::CacheUrls { url, source })?;
                let bucket = self.buckets.name(BucketKind::Dynamic);
                self.storage.open(bucket).await?;
                self.storage.put_all(bucket, entries).await?;
                self.logger
                    .info_builder("cached urls")
                    .field("bucket", bucket)
                    .field_u64("count", urls.len() as u64)
                    .emit();
            }
            ClientMessage::DeleteCache { cache_name } => {
                let deleted = self.storage.delete(&cache_name).await?;
                self.logger
                    .info_builder("delete cache")
                    .field("bucket", cache_name.as_str())
                    .field("existed", deleted.to_string())
                    .emit();
            }
        }
        Ok(())
    }

    /// Show the notification for a push. Returns what was shown.
    pub async fn on_push(&self, payload: Option<&str>) -> Notification {
        let notification = Notification::from_push(&self.config.notification, payload);
        self.host.show_notification(notification.clone()).await;
        notification
    }

    /// React to a click on the notification.
    pub async fn on_notification_click(&self, action: Option<&str>) -> NotificationClick {
        let click = NotificationClick::from_action(action);
        if let Some(page) = click.target(&self.config) {
            self.host.open_window(page).await;
        }
        click
    }

    /// Replay actions queued under `tag`. Returns how many were processed.
    pub async fn sync(&self, tag: &str) -> WorkerResult<usize> {
        let actions = self.pending.for_tag(tag);
        self.logger
            .info_builder("background sync")
            .field("tag", tag)
            .field_u64("pending", actions.len() as u64)
            .emit();
        Ok(actions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;
    use anime_cache::MemoryCacheStorage;
    use anime_core::Response;
    use anime_data::MemoryNetwork;

    fn site() -> MemoryNetwork {
        let network = MemoryNetwork::new();
        for url in WorkerConfig::default().manifest {
            let body = format!("content of {url}");
            network.insert(url, Response::ok(body));
        }
        network.insert("/assets/images/placeholder.webp", Response::ok("webp"));
        network
    }

    struct Fixture {
        worker: LifecycleController,
        storage: Arc<MemoryCacheStorage>,
        network: Arc<MemoryNetwork>,
        host: Arc<LocalHost>,
    }

    fn fixture(network: MemoryNetwork) -> Fixture {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(network);
        let host = Arc::new(LocalHost::new());
        let worker = LifecycleController::new(
            Arc::new(WorkerConfig::default()),
            storage.clone(),
            network.clone(),
            host.clone(),
        );
        Fixture {
            worker,
            storage,
            network,
            host,
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(LifecycleState, LifecycleState)>>);

    impl LifecycleObserver for Recorder {
        fn on_transition(&self, from: LifecycleState, to: LifecycleState) {
            self.0.lock().unwrap().push((from, to));
        }
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let f = fixture(site());

        let count = f.worker.install().await.unwrap();

        assert_eq!(count, WorkerConfig::default().manifest.len());
        assert_eq!(f.worker.state(), LifecycleState::Waiting);
        assert!(f.host.take_skip_waiting());

        let stored = f
            .storage
            .get("startanime-static-v1.0.0", &RequestKey::get("/css/main.css"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, b"content of /css/main.css");

        let placeholder = f
            .storage
            .get(
                "startanime-image-v1.0.0",
                &RequestKey::get("/assets/images/placeholder.webp"),
            )
            .await
            .unwrap();
        assert!(placeholder.is_some());
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let network = site();
        network.remove("/js/recommendations.js");
        let f = fixture(network);

        let err = f.worker.install().await.unwrap_err();

        match err {
            WorkerError::Install { url, .. } => assert_eq!(url, "/js/recommendations.js"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(f.worker.state(), LifecycleState::Redundant);
        assert!(!f.host.take_skip_waiting());
        assert!(f
            .storage
            .keys("startanime-static-v1.0.0")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_placeholder_is_not_fatal() {
        let network = site();
        network.remove("/assets/images/placeholder.webp");
        let f = fixture(network);

        f.worker.install().await.unwrap();
        assert_eq!(f.worker.state(), LifecycleState::Waiting);
    }

    #[tokio::test]
    async fn test_install_twice_is_rejected() {
        let f = fixture(site());
        f.worker.install().await.unwrap();

        let err = f.worker.install().await.unwrap_err();
        assert!(matches!(err, WorkerError::Lifecycle(_)));
    }

    #[tokio::test]
    async fn test_activate_evicts_foreign_and_old_buckets() {
        let f = fixture(site());
        for bucket in [
            "startanime-static-v0.9.0",
            "startanime-static-v1.0.0",
            "other-app-cache",
        ] {
            f.storage.open(bucket).await.unwrap();
        }

        f.worker.install().await.unwrap();
        let mut deleted = f.worker.activate().await.unwrap();
        deleted.sort();

        assert_eq!(deleted, vec!["other-app-cache", "startanime-static-v0.9.0"]);
        assert_eq!(f.worker.state(), LifecycleState::Active);
        assert_eq!(f.host.claims(), 1);

        let remaining = f.storage.buckets().await.unwrap();
        assert!(remaining.contains(&"startanime-static-v1.0.0".to_string()));
        assert!(!remaining.contains(&"other-app-cache".to_string()));
    }

    #[tokio::test]
    async fn test_activate_before_install_is_rejected() {
        let f = fixture(site());
        assert!(f.worker.activate().await.is_err());
        assert_eq!(f.worker.state(), LifecycleState::Installing);
    }

    #[tokio::test]
    async fn test_observers_see_transitions() {
        let recorder = Arc::new(Recorder::default());
        let f = fixture(site());
        let worker = f.worker.with_observer(recorder.clone());

        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        worker.retire().unwrap();

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (LifecycleState::Installing, LifecycleState::Waiting),
                (LifecycleState::Waiting, LifecycleState::Activating),
                (LifecycleState::Activating, LifecycleState::Active),
                (LifecycleState::Active, LifecycleState::Redundant),
            ]
        );
    }

    #[tokio::test]
    async fn test_cache_urls_message() {
        let f = fixture(site());
        f.network.insert("/api/top", Response::ok("top"));

        f.worker
            .handle_message(ClientMessage::CacheUrls {
                urls: vec!["/api/top".to_string(), "/about.html".to_string()],
            })
            .await
            .unwrap();

        let keys = f.storage.keys("startanime-dynamic-v1.0.0").await.unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_urls_failure_stores_nothing() {
        let f = fixture(site());

        let err = f
            .worker
            .handle_message(ClientMessage::CacheUrls {
                urls: vec!["/about.html".to_string(), "/missing".to_string()],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::CacheUrls { .. }));
        assert!(!f.storage.has("startanime-dynamic-v1.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_skip_waiting_messages() {
        let f = fixture(site());
        f.storage.open("legacy").await.unwrap();

        f.worker
            .handle_message(ClientMessage::DeleteCache {
                cache_name: "legacy".to_string(),
            })
            .await
            .unwrap();
        assert!(!f.storage.has("legacy").await.unwrap());

        f.worker
            .handle_message(ClientMessage::SkipWaiting)
            .await
            .unwrap();
        assert!(f.host.take_skip_waiting());
    }

    #[tokio::test]
    async fn test_push_and_click() {
        let f = fixture(site());

        let shown = f.worker.on_push(None).await;
        assert_eq!(f.host.notifications(), vec![shown]);

        f.worker.on_notification_click(Some("close")).await;
        assert!(f.host.opened_windows().is_empty());

        let click = f.worker.on_notification_click(Some("explore")).await;
        assert_eq!(click, NotificationClick::Explore);
        assert_eq!(f.host.opened_windows(), vec!["/recommendations.html"]);
    }

    #[tokio::test]
    async fn test_sync_is_noop() {
        let f = fixture(site());
        assert_eq!(f.worker.sync("background-sync").await.unwrap(), 0);
        assert_eq!(f.network.fetch_count(), 0);
    }
}
