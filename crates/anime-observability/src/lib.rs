//! Observability for the StartAnime offline worker.
//!
//! This crate provides:
//! - `StructuredLogger` - Component-scoped structured logging on `tracing`
//! - `LogBuilder` - Fluent per-entry fields
//! - `init_tracing` - Subscriber setup for binaries

mod logging;
mod subscriber;

pub use logging::*;
pub use subscriber::*;
