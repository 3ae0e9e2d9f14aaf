//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    let worker = &ctx.config.worker;

    ctx.output.info("[worker]");
    ctx.output.kv("app_prefix", &worker.app_prefix);
    ctx.output.kv("version", &worker.version);
    ctx.output.kv("offline_page", &worker.offline_page);
    ctx.output.kv("placeholder_image", &worker.placeholder_image);
    ctx.output.kv("manifest", &format!("{} URLs", worker.manifest.len()));

    ctx.output.info("");
    ctx.output.info("[worker.strategies]");
    for class in anime_core::RequestClassification::ALL {
        ctx.output
            .kv(class.as_str(), &worker.strategies.strategy_for(class).to_string());
    }

    ctx.output.info("");
    ctx.output.info("[network]");
    match (&ctx.config.network.site_dir, &ctx.config.network.base_url) {
        (Some(dir), _) => ctx.output.kv("site_dir", dir),
        (None, Some(url)) => ctx.output.kv("base_url", url),
        (None, None) => ctx.output.kv("site_dir", "(working directory)"),
    }
    ctx.output
        .kv("timeout_ms", &ctx.config.network.timeout_ms.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv(
        "dir",
        ctx.config.storage.dir.as_deref().unwrap_or("(in memory)"),
    );

    ctx.output.info("");
    ctx.output.info("[fragments]");
    ctx.output.kv("base", &ctx.config.fragments.base);

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("startanime.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
