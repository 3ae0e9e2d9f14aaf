//! Network access for the StartAnime offline worker.
//!
//! This crate provides:
//! - `Network` - The fetch seam every cache strategy goes through
//! - `HttpNetwork` - Fetch over HTTP(S) relative to a site base URL
//! - `SiteDirNetwork` - Serve a built site directory from disk
//! - `MemoryNetwork` - Scripted in-memory network with an offline switch
//! - `TimeoutConfig` - Client-level request timeouts

mod client;
mod http_client;
mod memory;
mod site;
mod timeout;

pub use client::*;
pub use http_client::*;
pub use memory::*;
pub use site::*;
pub use timeout::*;
