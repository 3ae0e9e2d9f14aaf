//! Offline worker for the StartAnime site.
//!
//! This crate provides:
//! - `RequestClassifier` - Ordered suffix table mapping URLs to classifications
//! - `CacheRouter` - Cache-first and network-first strategies with offline fallbacks
//! - `LifecycleController` - Install, activate, messages, push and sync hooks
//! - `Registration` - Version handover and update signaling to page clients
//! - `MessagePort` - Fire-and-forget message channel into the worker
//! - `WorkerHost` / `LocalHost` - The runtime seam and an in-process runtime
//!
//! # Example
//!
//! ```ignore
//! use anime_worker::{LifecycleController, LocalHost, Registration};
//!
//! let host = Arc::new(LocalHost::new());
//! let worker = Arc::new(LifecycleController::new(config, storage, network, host.clone()));
//!
//! let mut registration = Registration::new(host);
//! registration.install(worker.clone()).await?;
//!
//! let routed = worker.router().handle(&Request::get("/css/main.css")).await?;
//! ```

mod actor;
mod classify;
mod controller;
mod error;
mod fallback;
mod host;
mod message;
mod notification;
mod registration;
mod router;
mod sync;

pub use actor::*;
pub use classify::*;
pub use controller::*;
pub use error::*;
pub use fallback::*;
pub use host::*;
pub use message::*;
pub use notification::*;
pub use registration::*;
pub use router::*;
pub use sync::*;
