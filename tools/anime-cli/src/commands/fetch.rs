//! Route one request through the worker.

use anime_core::Request;
use anime_worker::CacheRouter;
use anyhow::{Context as _, Result};
use http::Method;

use super::FetchArgs;
use crate::context::Context;
use crate::output::{cache_badge, format_bytes};

/// Run the fetch command.
pub async fn run(args: FetchArgs, ctx: &Context) -> Result<()> {
    let method: Method = args
        .method
        .to_ascii_uppercase()
        .parse()
        .with_context(|| format!("Invalid method: {}", args.method))?;

    let router = CacheRouter::new(ctx.worker_config(), ctx.storage().await?, ctx.network()?);
    let request = Request::new(method, args.url.as_str());

    let routed = router
        .handle(&request)
        .await
        .with_context(|| format!("Request failed: {}", args.url))?;

    let class = routed
        .classification
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "url": args.url,
            "status": routed.response.status,
            "cache": routed.status.to_string(),
            "classification": class,
            "content_type": routed.response.content_type(),
            "bytes": routed.response.body.len(),
        }));
    } else {
        ctx.output.header(&format!("{} {}", request.method, args.url));
        ctx.output.kv("status", &routed.response.status.to_string());
        ctx.output.kv("cache", &cache_badge(routed.status));
        ctx.output.kv("classification", &class);
        ctx.output
            .kv("content-type", routed.response.content_type().unwrap_or("-"));
        ctx.output
            .kv("size", &format_bytes(routed.response.body.len() as u64));
    }

    if args.body {
        println!("{}", routed.response.text());
    }

    Ok(())
}
