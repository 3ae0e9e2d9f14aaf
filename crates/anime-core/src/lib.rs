//! Core abstractions for the StartAnime offline worker.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Request` / `Response` - Transport-neutral request and response model
//! - `RequestClassification` / `StrategyTable` - Cache strategy selection
//! - `LifecycleState` - Worker lifecycle state machine
//! - `WorkerConfig` - Bucket naming, manifest and fallback configuration

mod classification;
mod config;
mod lifecycle;
mod request;

pub use classification::*;
pub use config::*;
pub use lifecycle::*;
pub use request::*;
