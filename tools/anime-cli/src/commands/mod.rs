//! CLI command implementations.

pub mod buckets;
pub mod config;
pub mod fetch;
pub mod fragment;
pub mod install;
pub mod message;

use clap::{Args, Subcommand};

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Install only; leave activation (and old bucket cleanup) for later.
    #[arg(long)]
    pub no_activate: bool,
}

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// URL or site path to request.
    pub url: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Print the response body.
    #[arg(short, long)]
    pub body: bool,
}

/// Arguments for the buckets command.
#[derive(Args)]
pub struct BucketsArgs {
    #[command(subcommand)]
    pub command: Option<BucketsCommand>,
}

#[derive(Subcommand)]
pub enum BucketsCommand {
    /// List buckets.
    List,
    /// List the entries of a bucket.
    Keys {
        /// Bucket name.
        name: String,
    },
    /// Delete a bucket.
    Delete {
        /// Bucket name.
        name: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the fragment command.
#[derive(Args)]
pub struct FragmentArgs {
    /// Component name, e.g. `header` or `anime-card`.
    pub name: String,

    /// Template data as JSON.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Mount point id.
    #[arg(short, long, default_value = "app")]
    pub target: String,
}

/// Arguments for the message command.
#[derive(Args)]
pub struct MessageArgs {
    /// Message JSON, e.g. `{"type":"DELETE_CACHE","cacheName":"old"}`.
    pub json: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
