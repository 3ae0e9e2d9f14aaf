//! CLI configuration.

use anime_core::WorkerConfig;
use anime_fragments::DEFAULT_COMPONENTS_BASE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file names searched from the working directory upward.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["startanime.toml", ".startanime.toml", "startanime.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Where requests go.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Where buckets live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Component fragments.
    #[serde(default)]
    pub fragments: FragmentsConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(&content, path.ends_with(".json"))
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Parse TOML, or JSON when `json` is set.
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }
}

/// Network settings. A site directory wins over a base URL; with neither,
/// the working directory is served as the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Fetch over HTTP(S) relative to this URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Serve requests from this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_dir: Option<String>,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            site_dir: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Storage settings. Without a directory buckets live in memory for the
/// duration of one command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Fragment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentsConfig {
    /// Directory (or URL path) holding component files.
    #[serde(default = "default_components_base")]
    pub base: String,
}

fn default_components_base() -> String {
    DEFAULT_COMPONENTS_BASE.to_string()
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            base: default_components_base(),
        }
    }
}

/// Generate a default startanime.toml.
pub fn generate_default_config() -> String {
    let worker = WorkerConfig::default();
    let manifest = worker
        .manifest
        .iter()
        .map(|url| format!("    \"{}\",", url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"# StartAnime offline worker configuration

[worker]
app_prefix = "{prefix}"
version = "{version}"
offline_page = "{offline}"
placeholder_image = "{placeholder}"
recommendations_page = "{recommendations}"
manifest = [
{manifest}
]

[worker.strategies]
static = "cache-first"
image = "cache-first"
data = "cache-first"
dynamic = "network-first"

[network]
site_dir = "."
# base_url = "https://startanime.example"
timeout_ms = 15000

[storage]
dir = ".startanime/cache"

[fragments]
base = "{components}"
"#,
        prefix = worker.app_prefix,
        version = worker.version,
        offline = worker.offline_page,
        placeholder = worker.placeholder_image,
        recommendations = worker.recommendations_page,
        manifest = manifest,
        components = DEFAULT_COMPONENTS_BASE,
    )
}
