//! Version handover between an active worker and its successor.

use std::sync::Arc;

use anime_observability::StructuredLogger;

use crate::controller::LifecycleController;
use crate::error::WorkerResult;
use crate::host::WorkerHost;
use crate::message::WorkerMessage;

/// Tracks which worker version controls the pages and which one is
/// waiting to take over.
///
/// Pages hear `UPDATE_AVAILABLE` when a new version finishes installing
/// while an older one is in control, and `RELOAD_PAGE` when control passes
/// from one version to another.
pub struct Registration {
    host: Arc<dyn WorkerHost>,
    active: Option<Arc<LifecycleController>>,
    waiting: Option<Arc<LifecycleController>>,
    logger: StructuredLogger,
}

impl Registration {
    /// Create an empty registration on `host`.
    pub fn new(host: Arc<dyn WorkerHost>) -> Self {
        Self {
            host,
            active: None,
            waiting: None,
            logger: StructuredLogger::new("registration"),
        }
    }

    /// The controlling worker.
    pub fn active(&self) -> Option<&Arc<LifecycleController>> {
        self.active.as_ref()
    }

    /// The installed worker waiting for control.
    pub fn waiting(&self) -> Option<&Arc<LifecycleController>> {
        self.waiting.as_ref()
    }

    /// Install `worker`, then hand it control if nothing controls the
    /// pages yet or it asked to skip waiting.
    pub async fn install(&mut self, worker: Arc<LifecycleController>) -> WorkerResult<()> {
        worker.install().await?;

        if let Some(active) = &self.active {
            self.logger
                .info_builder("update available")
                .field("active", active.version())
                .field("waiting", worker.version())
                .emit();
            self.host.post_message(WorkerMessage::UpdateAvailable).await;
        }

        if let Some(superseded) = self.waiting.replace(worker) {
            self.logger
                .info_builder("waiting worker superseded")
                .field("version", superseded.version())
                .emit();
        }

        self.try_activate().await?;
        Ok(())
    }

    /// Activate the waiting worker when allowed. Returns whether control
    /// changed hands.
    pub async fn try_activate(&mut self) -> WorkerResult<bool> {
        if self.waiting.is_none() {
            return Ok(false);
        }
        let skip_waiting = self.host.take_skip_waiting();
        if self.active.is_some() && !skip_waiting {
            return Ok(false);
        }

        let Some(next) = self.waiting.take() else {
            return Ok(false);
        };
        next.activate().await?;

        if let Some(previous) = self.active.replace(next) {
            previous.retire()?;
            self.logger
                .info_builder("controller changed")
                .field("from", previous.version())
                .emit();
            self.host.post_message(WorkerMessage::ReloadPage).await;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;
    use crate::notification::Notification;
    use anime_cache::{CacheStorage, MemoryCacheStorage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use anime_core::{LifecycleState, Response, WorkerConfig};
    use anime_data::MemoryNetwork;
    use tokio::sync::broadcast::error::TryRecvError;

    fn network() -> Arc<MemoryNetwork> {
        let network = MemoryNetwork::new();
        for url in WorkerConfig::default().manifest {
            network.insert(url, Response::ok("ok"));
        }
        Arc::new(network)
    }

    fn worker(
        version: &str,
        storage: &Arc<MemoryCacheStorage>,
        network: &Arc<MemoryNetwork>,
        host: &Arc<LocalHost>,
    ) -> Arc<LifecycleController> {
        let config = WorkerConfig {
            version: version.to_string(),
            ..WorkerConfig::default()
        };
        Arc::new(LifecycleController::new(
            Arc::new(config),
            storage.clone(),
            network.clone(),
            host.clone(),
        ))
    }

    #[tokio::test]
    async fn test_first_install_takes_control_quietly() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = network();
        let host = Arc::new(LocalHost::new());
        let mut page = host.connect();

        let mut registration = Registration::new(host.clone());
        registration
            .install(worker("v1.0.0", &storage, &network, &host))
            .await
            .unwrap();

        let active = registration.active().unwrap();
        assert_eq!(active.version(), "v1.0.0");
        assert_eq!(active.state(), LifecycleState::Active);
        assert!(registration.waiting().is_none());
        assert_eq!(page.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_new_version_signals_update_then_reload() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = network();
        let host = Arc::new(LocalHost::new());

        let mut registration = Registration::new(host.clone());
        let old = worker("v1.0.0", &storage, &network, &host);
        registration.install(old.clone()).await.unwrap();

        let mut page = host.connect();
        registration
            .install(worker("v1.1.0", &storage, &network, &host))
            .await
            .unwrap();

        assert_eq!(page.recv().await.unwrap(), WorkerMessage::UpdateAvailable);
        assert_eq!(page.recv().await.unwrap(), WorkerMessage::ReloadPage);

        assert_eq!(registration.active().unwrap().version(), "v1.1.0");
        assert_eq!(old.state(), LifecycleState::Redundant);

        let buckets = storage.buckets().await.unwrap();
        assert!(buckets.iter().all(|name| name.ends_with("v1.1.0")));
    }

    #[tokio::test]
    async fn test_failed_install_keeps_current_controller() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = network();
        let host = Arc::new(LocalHost::new());

        let mut registration = Registration::new(host.clone());
        registration
            .install(worker("v1.0.0", &storage, &network, &host))
            .await
            .unwrap();

        network.set_online(false);
        let mut page = host.connect();
        let broken = worker("v1.1.0", &storage, &network, &host);
        assert!(registration.install(broken.clone()).await.is_err());

        assert_eq!(broken.state(), LifecycleState::Redundant);
        assert_eq!(registration.active().unwrap().version(), "v1.0.0");
        assert_eq!(page.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_nothing_to_activate() {
        let mut registration = Registration::new(Arc::new(LocalHost::new()));
        assert!(!registration.try_activate().await.unwrap());
    }

    /// Host that records posted messages instead of broadcasting them.
    #[derive(Default)]
    struct RecordingHost {
        skip_waiting: AtomicBool,
        posted: Mutex<Vec<WorkerMessage>>,
    }

    #[async_trait]
    impl WorkerHost for RecordingHost {
        async fn skip_waiting(&self) {
            self.skip_waiting.store(true, Ordering::SeqCst);
        }

        fn take_skip_waiting(&self) -> bool {
            self.skip_waiting.swap(false, Ordering::SeqCst)
        }

        async fn claim_clients(&self) -> usize {
            0
        }

        async fn post_message(&self, message: WorkerMessage) -> usize {
            self.posted.lock().unwrap().push(message);
            1
        }

        async fn show_notification(&self, _notification: Notification) {}

        async fn open_window(&self, _url: &str) {}
    }

    #[tokio::test]
    async fn test_signaling_through_any_host() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = network();
        let host = Arc::new(RecordingHost::default());

        let make = |version: &str| {
            let config = WorkerConfig {
                version: version.to_string(),
                ..WorkerConfig::default()
            };
            Arc::new(LifecycleController::new(
                Arc::new(config),
                storage.clone(),
                network.clone(),
                host.clone(),
            ))
        };

        let mut registration = Registration::new(host.clone());
        registration.install(make("v1.0.0")).await.unwrap();
        registration.install(make("v1.1.0")).await.unwrap();

        assert_eq!(registration.active().unwrap().version(), "v1.1.0");
        assert_eq!(
            host.posted.lock().unwrap().clone(),
            vec![WorkerMessage::UpdateAvailable, WorkerMessage::ReloadPage]
        );
    }
}
