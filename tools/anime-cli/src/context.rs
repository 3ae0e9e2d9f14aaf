//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anime_cache::{CacheStorage, FsCacheStorage, MemoryCacheStorage};
use anime_core::WorkerConfig;
use anime_data::{HttpNetwork, Network, SiteDirNetwork, TimeoutConfig};
use anime_fragments::FragmentLoader;
use anime_worker::{LifecycleController, WorkerHost};
use anyhow::{Context as _, Result};

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self {
            config,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Worker configuration.
    pub fn worker_config(&self) -> Arc<WorkerConfig> {
        Arc::new(self.config.worker.clone())
    }

    /// Network described by the `[network]` section.
    pub fn network(&self) -> Result<Arc<dyn Network>> {
        let network = &self.config.network;
        if let Some(dir) = &network.site_dir {
            return Ok(Arc::new(SiteDirNetwork::new(self.resolve_path(dir))));
        }
        if let Some(base_url) = &network.base_url {
            let timeouts =
                TimeoutConfig::from_total(std::time::Duration::from_millis(network.timeout_ms));
            let client = HttpNetwork::new(base_url, &timeouts)
                .with_context(|| format!("Invalid base URL: {}", base_url))?;
            return Ok(Arc::new(client));
        }
        Ok(Arc::new(SiteDirNetwork::new(self.cwd.clone())))
    }

    /// Storage described by the `[storage]` section.
    pub async fn storage(&self) -> Result<Arc<dyn CacheStorage>> {
        match &self.config.storage.dir {
            Some(dir) => {
                let root = self.resolve_path(dir);
                let storage = FsCacheStorage::open_dir(root.clone())
                    .await
                    .with_context(|| format!("Failed to open cache at {}", root.display()))?;
                Ok(Arc::new(storage))
            }
            None => {
                self.output
                    .debug("No storage directory configured, using in-memory buckets");
                Ok(Arc::new(MemoryCacheStorage::new()))
            }
        }
    }

    /// A worker wired to the configured network and storage.
    pub async fn worker(&self, host: Arc<dyn WorkerHost>) -> Result<Arc<LifecycleController>> {
        Ok(Arc::new(LifecycleController::new(
            self.worker_config(),
            self.storage().await?,
            self.network()?,
            host,
        )))
    }

    /// A fragment loader reading from `[fragments].base`.
    pub fn fragment_loader(&self) -> Result<FragmentLoader> {
        Ok(FragmentLoader::new(self.network()?).with_base(self.config.fragments.base.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("startanime.toml"),
            "[worker]\nversion = \"v9.9.9\"\n",
        )
        .unwrap();
        let nested = dir.path().join("site").join("pages");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Context::find_config(&nested).unwrap();
        assert_eq!(config.worker.version, "v9.9.9");
    }

    #[test]
    fn test_resolve_path() {
        let ctx = Context {
            config: CliConfig::default(),
            output: Output::new(false, true),
            cwd: PathBuf::from("/srv/site"),
        };
        assert_eq!(ctx.resolve_path("cache"), PathBuf::from("/srv/site/cache"));
        assert_eq!(ctx.resolve_path("/var/cache"), PathBuf::from("/var/cache"));
    }
}
