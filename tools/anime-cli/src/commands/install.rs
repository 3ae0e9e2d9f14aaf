//! Install (and activate) the worker.

use std::sync::Arc;

use anime_worker::LocalHost;
use anyhow::{Context as _, Result};

use super::InstallArgs;
use crate::context::Context;

/// Run the install command.
pub async fn run(args: InstallArgs, ctx: &Context) -> Result<()> {
    let host = Arc::new(LocalHost::new());
    let worker = ctx.worker(host.clone()).await?;
    let total = if args.no_activate { 1 } else { 2 };

    ctx.output.header(&format!("Installing {}", worker.version()));

    ctx.output.step(1, total, "Pre-caching manifest");
    let spinner = ctx
        .output
        .spinner(&format!("Fetching {} URLs", worker.config().manifest.len()));
    let installed = worker.install().await;
    spinner.finish_and_clear();
    let cached = installed.context("Install failed")?;
    ctx.output.success(&format!(
        "Cached {} entries in {}",
        cached,
        worker.buckets().name(anime_cache::BucketKind::Static)
    ));

    if args.no_activate {
        ctx.output.info("Worker is waiting; run install again to activate.");
        return Ok(());
    }

    ctx.output.step(2, total, "Activating");
    let deleted = worker.activate().await.context("Activation failed")?;
    for name in &deleted {
        ctx.output.list_item(&format!("deleted {}", name));
    }
    ctx.output.success(&format!(
        "Worker {} is {}",
        worker.version(),
        worker.state()
    ));

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "version": worker.version(),
            "state": worker.state().to_string(),
            "cached": cached,
            "deleted": deleted,
        }));
    }

    Ok(())
}
