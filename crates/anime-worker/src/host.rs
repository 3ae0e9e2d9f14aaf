//! The runtime seam: what a worker asks of its host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::message::WorkerMessage;
use crate::notification::Notification;

/// Services the hosting runtime provides to a worker.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Ask for this worker to be activated without waiting for old pages
    /// to close.
    async fn skip_waiting(&self);

    /// Consume a pending skip-waiting request.
    fn take_skip_waiting(&self) -> bool;

    /// Take control of every open page. Returns the number of pages.
    async fn claim_clients(&self) -> usize;

    /// Post a message to every page. Returns the number of recipients.
    async fn post_message(&self, message: WorkerMessage) -> usize;

    /// Display a notification.
    async fn show_notification(&self, notification: Notification);

    /// Open (or focus) a page at `url`.
    async fn open_window(&self, url: &str);
}

/// In-process host. Pages are broadcast receivers obtained with
/// [`LocalHost::connect`].
#[derive(Debug)]
pub struct LocalHost {
    clients: broadcast::Sender<WorkerMessage>,
    skip_waiting: AtomicBool,
    claims: AtomicUsize,
    notifications: Mutex<Vec<Notification>>,
    windows: Mutex<Vec<String>>,
}

impl LocalHost {
    /// Create a host with no connected pages.
    pub fn new() -> Self {
        let (clients, _) = broadcast::channel(16);
        Self {
            clients,
            skip_waiting: AtomicBool::new(false),
            claims: AtomicUsize::new(0),
            notifications: Mutex::new(Vec::new()),
            windows: Mutex::new(Vec::new()),
        }
    }

    /// Connect a page and receive worker messages.
    pub fn connect(&self) -> broadcast::Receiver<WorkerMessage> {
        self.clients.subscribe()
    }

    /// Number of connected pages.
    pub fn client_count(&self) -> usize {
        self.clients.receiver_count()
    }

    /// Consume a pending skip-waiting request.
    pub fn take_skip_waiting(&self) -> bool {
        self.skip_waiting.swap(false, Ordering::SeqCst)
    }

    /// Number of times a worker claimed the pages.
    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    /// Notifications shown so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Pages opened so far.
    pub fn opened_windows(&self) -> Vec<String> {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkerHost for LocalHost {
    async fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    fn take_skip_waiting(&self) -> bool {
        LocalHost::take_skip_waiting(self)
    }

    async fn claim_clients(&self) -> usize {
        self.claims.fetch_add(1, Ordering::SeqCst);
        self.client_count()
    }

    async fn post_message(&self, message: WorkerMessage) -> usize {
        // No receivers is not an error; nobody is listening.
        self.clients.send(message).unwrap_or(0)
    }

    async fn show_notification(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }

    async fn open_window(&self, url: &str) {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
    }
}
