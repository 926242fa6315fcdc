use super::json_config::ClientConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

const CONFIG_TTL: Duration = Duration::from_secs(60); // 1 minute TTL

/// Directory under the workspace root holding the client configuration
pub const CONFIG_DIR_NAME: &str = ".refactor-client";

#[derive(Debug)]
struct CachedConfig {
    config: ClientConfig,
    loaded_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_root: PathBuf,
    cached_config: Arc<Mutex<Option<CachedConfig>>>,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified config root
    pub fn new(config_root: PathBuf) -> Self {
        Self {
            config_root,
            cached_config: Arc::new(Mutex::new(None)),
        }
    }

    /// ConfigManager for the `.refactor-client` folder of a workspace
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(CONFIG_DIR_NAME))
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    /// Get the client configuration (with TTL caching)
    pub fn get_config(&self) -> anyhow::Result<ClientConfig> {
        let mut cache = self.cached_config.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = cache.as_ref().filter(|c| c.loaded_at.elapsed() <= CONFIG_TTL) {
            return Ok(cached.config.clone());
        }

        let config = ClientConfig::get_or_create(&self.config_root)?;
        *cache = Some(CachedConfig {
            config: config.clone(),
            loaded_at: Instant::now(),
        });
        Ok(config)
    }
}
