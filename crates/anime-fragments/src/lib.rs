//! HTML component fragments for StartAnime pages.
//!
//! This crate provides:
//! - `FragmentLoader` - Probe, extract, memoize and render named fragments
//! - `ExtractionRules` - Per-component rule for picking markup out of a page
//! - `TemplateData` / `render_template` - `{{ key }}` placeholder substitution
//! - `MountPoint` / `ComponentNode` - Injection targets and detached nodes
//!
//! # Example
//!
//! ```ignore
//! use anime_fragments::{FragmentLoader, MountPoint, TemplateData};
//!
//! let loader = FragmentLoader::new(network);
//! let mut slot = MountPoint::new("site-header");
//!
//! loader.inject_component("header", &mut slot, None).await;
//! let card = loader.create_component("anime-card", Some(&data)).await?;
//! ```

mod error;
mod extract;
mod loader;
mod mount;
mod template;

pub use error::*;
pub use extract::*;
pub use loader::*;
pub use mount::*;
pub use template::*;
