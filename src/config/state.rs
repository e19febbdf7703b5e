// Application state module
// Request context built once at startup and shared by every connection

use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{Config, FrontendConfig};
use crate::error::AppError;
use crate::http::cors::CorsPolicy;
use crate::services::Services;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Collaborators wired according to the `app` flags
    pub services: Services,
    /// Present only in development mode
    pub cors: Option<CorsPolicy>,
    /// Present only outside development mode
    pub frontend: Option<Frontend>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    /// Build state from configuration, constructing the enabled services
    pub fn new(config: Config) -> Result<Self, AppError> {
        let services = Services::from_config(&config)?;
        Ok(Self::with_services(config, services))
    }

    /// Build state around an already constructed set of services
    pub fn with_services(config: Config, services: Services) -> Self {
        let development = config.app.development;

        let cors = development.then(|| CorsPolicy::from_config(&config.cors));
        let frontend = (!development).then(|| Frontend::new(&config.frontend));
        let cached_access_log = Arc::new(AtomicBool::new(config.logging.access_log));

        Self {
            config,
            services,
            cors,
            frontend,
            cached_access_log,
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }

    pub fn set_access_log(&self, enabled: bool) {
        self.cached_access_log.store(enabled, Ordering::Relaxed);
    }
}

/// Location of the bundled frontend plus a cache for its index document
pub struct Frontend {
    pub dir: PathBuf,
    pub index_file: String,
    pub mount: String,
    pub root_files: Vec<String>,
    index_cache: RwLock<Option<Bytes>>,
}

impl Frontend {
    pub fn new(config: &FrontendConfig) -> Self {
        // "/static/" and "static" both mean the "/static" prefix
        let mount = format!("/{}", config.mount.trim_matches('/'));

        Self {
            dir: PathBuf::from(&config.dir),
            index_file: config.index_file.clone(),
            mount,
            root_files: config.root_files.clone(),
            index_cache: RwLock::new(None),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index_file)
    }

    /// Path below the mount prefix, or None when `path` is outside the mount
    pub fn strip_mount<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.mount.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }

    pub fn is_root_file(&self, path: &str) -> bool {
        self.root_files.iter().any(|p| p == path)
    }

    /// Read the index document, serving later calls from memory
    pub async fn index_html(&self) -> Option<Bytes> {
        {
            let cache = self.index_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                return Some(cached.clone());
            }
        }

        let content = Bytes::from(read_file(&self.index_path()).await?);

        {
            let mut cache = self.index_cache.write().await;
            *cache = Some(content.clone());
        }

        Some(content)
    }
}

async fn read_file(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(content) => Some(content),
        Err(e) => {
            crate::logger::log_warning(&format!(
                "Frontend file '{}' unavailable: {e}",
                path.display()
            ));
            None
        }
    }
}
