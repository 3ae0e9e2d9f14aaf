//! StartAnime CLI - drive the offline worker from the command line.
//!
//! Commands:
//! - `startanime install` - Pre-cache the manifest and activate
//! - `startanime fetch` - Route one request through the cache
//! - `startanime buckets` - Inspect and delete cache buckets
//! - `startanime fragment` - Load and render a component fragment
//! - `startanime message` - Post a client message to the worker
//! - `startanime config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anime_observability::{init_tracing, LogFormat, LogLevel};
use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BucketsArgs, ConfigArgs, FetchArgs, FragmentArgs, InstallArgs, MessageArgs};

/// StartAnime - offline worker for the StartAnime site
#[derive(Parser)]
#[command(name = "startanime")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-cache the manifest and activate the worker
    Install(InstallArgs),

    /// Route a request through the worker
    Fetch(FetchArgs),

    /// Inspect cache buckets
    Buckets(BucketsArgs),

    /// Load and render a component fragment
    Fragment(FragmentArgs),

    /// Post a message to the worker
    Message(MessageArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    init_tracing(format, level);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(args, &ctx).await,
        Commands::Fetch(args) => commands::fetch::run(args, &ctx).await,
        Commands::Buckets(args) => commands::buckets::run(args, &ctx).await,
        Commands::Fragment(args) => commands::fragment::run(args, &ctx).await,
        Commands::Message(args) => commands::message::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
