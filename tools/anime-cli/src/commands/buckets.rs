//! Cache bucket inspection.

use anime_cache::BucketSet;
use anyhow::{bail, Result};
use dialoguer::Confirm;

use super::{BucketsArgs, BucketsCommand};
use crate::context::Context;
use crate::output::format_bytes;

/// Run the buckets command.
pub async fn run(args: BucketsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(BucketsCommand::List) | None => list_buckets(ctx).await,
        Some(BucketsCommand::Keys { name }) => list_keys(&name, ctx).await,
        Some(BucketsCommand::Delete { name, yes }) => delete_bucket(&name, yes, ctx).await,
    }
}

async fn list_buckets(ctx: &Context) -> Result<()> {
    let storage = ctx.storage().await?;
    let current = BucketSet::from_config(&ctx.config.worker);
    let names = storage.buckets().await?;

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let entries = storage.keys(&name).await?.len();
        let is_current = current.is_current(&name);
        rows.push((name, entries, is_current));
    }

    if ctx.output.is_json() {
        let rows: Vec<_> = rows
            .iter()
            .map(|(name, entries, is_current)| {
                serde_json::json!({ "name": name, "entries": entries, "current": is_current })
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Cache buckets");
    if rows.is_empty() {
        ctx.output.info("No buckets. Run `startanime install` to pre-cache the site.");
        return Ok(());
    }

    ctx.output.table_row(&["BUCKET", "ENTRIES", "STATE"], &[32, 8, 8]);
    for (name, entries, is_current) in &rows {
        let state = if *is_current { "current" } else { "stale" };
        let entries = entries.to_string();
        ctx.output
            .table_row(&[name.as_str(), entries.as_str(), state], &[32, 8, 8]);
    }

    Ok(())
}

async fn list_keys(name: &str, ctx: &Context) -> Result<()> {
    let storage = ctx.storage().await?;
    if !storage.has(name).await? {
        bail!("Bucket '{}' not found", name);
    }

    let keys = storage.keys(name).await?;
    let mut rows = Vec::with_capacity(keys.len());
    for key in &keys {
        if let Some(entry) = storage.get(name, key).await? {
            rows.push((key.to_string(), entry.status, entry.body.len(), entry.age_secs()));
        }
    }

    if ctx.output.is_json() {
        let rows: Vec<_> = rows
            .iter()
            .map(|(key, status, bytes, age)| {
                serde_json::json!({ "key": key, "status": status, "bytes": bytes, "age_secs": age })
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header(&format!("{} ({} entries)", name, rows.len()));
    for (key, status, bytes, age) in &rows {
        ctx.output.list_item(&format!(
            "{}  {}  {}  {}s old",
            key,
            status,
            format_bytes(*bytes as u64),
            age
        ));
    }

    Ok(())
}

async fn delete_bucket(name: &str, yes: bool, ctx: &Context) -> Result<()> {
    let storage = ctx.storage().await?;
    if !storage.has(name).await? {
        bail!("Bucket '{}' not found", name);
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete bucket '{}'?", name))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Delete cancelled");
            return Ok(());
        }
    }

    storage.delete(name).await?;
    ctx.output.success(&format!("Deleted {}", name));

    Ok(())
}
