//! Configuration loading for a worker generation.
//!
//! A worker is described by one TOML file: the version token, the scope,
//! the pre-cache asset list and any runtime caching rules.
//!
//! ```toml
//! version = "1718000000000"
//! scope = "https://app.example/"
//!
//! [assets]
//! build = ["/_app/immutable/entry/start.js"]
//! files = ["/favicon.png", "/robots.txt"]
//!
//! [[runtime_caching]]
//! url_pattern = "^https://placehold\\.co/.*"
//! cache_name = "image-cache"
//! max_entries = 50
//! max_age_secs = 2592000
//! ```
//!
//! Build tooling usually knows the version and asset list better than a
//! hand-written file; [`WorkerConfig::with_build_manifest()`] overlays them.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStrategy, RuntimeCache, RuntimeCacheRule};
use crate::controller::CacheController;
use crate::traits::{CacheStorage, Network, WorkerHost};
use crate::types::{AssetManifest, BuildManifest, DEFAULT_CACHE_PREFIX};
use crate::worker::ServiceWorker;
use crate::{PrecacheError, Result};

/// Worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Version token of the deployed build.
    pub version: String,
    /// Scope URL; its origin defines same-origin requests.
    pub scope: String,
    /// Prefix for versioned cache names (default: `cache-`).
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,
    #[serde(default)]
    pub assets: AssetManifest,
    #[serde(default)]
    pub runtime_caching: Vec<RuntimeCachingConfig>,
}

fn default_cache_prefix() -> String {
    DEFAULT_CACHE_PREFIX.to_string()
}

/// One declarative runtime caching rule.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeCachingConfig {
    /// Regular expression matched against the full request URL.
    pub url_pattern: String,
    #[serde(default)]
    pub handler: CacheStrategy,
    pub cache_name: String,
    /// Maximum entries (default: 50).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Maximum entry age in seconds (default: 30 days).
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Match the pattern case-insensitively (default: true).
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

fn default_max_entries() -> u64 {
    50
}

fn default_max_age_secs() -> u64 {
    60 * 60 * 24 * 30
}

fn default_case_insensitive() -> bool {
    true
}

impl RuntimeCachingConfig {
    pub fn to_rule(&self) -> Result<RuntimeCacheRule> {
        Ok(
            RuntimeCacheRule::with_case(&self.url_pattern, &self.cache_name, self.case_insensitive)?
                .strategy(self.handler)
                .max_entries(self.max_entries)
                .max_age(Duration::from_secs(self.max_age_secs)),
        )
    }
}

impl WorkerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrecacheError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            PrecacheError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            PrecacheError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PrecacheError::Configuration(e.to_string()))
    }

    /// Replace version and assets with those emitted by build tooling.
    pub fn with_build_manifest(mut self, manifest: BuildManifest) -> Self {
        self.version = manifest.version.into();
        self.assets = manifest.assets;
        self
    }

    /// Compile the runtime caching rules.
    pub fn runtime_rules(&self) -> Result<Vec<RuntimeCacheRule>> {
        self.runtime_caching
            .iter()
            .map(RuntimeCachingConfig::to_rule)
            .collect()
    }

    /// Build a controller from this configuration.
    pub fn build_controller(
        &self,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Result<CacheController> {
        CacheController::builder()
            .version(&self.version)
            .cache_prefix(&self.cache_prefix)
            .scope(&self.scope)
            .assets(self.assets.clone())
            .storage(storage)
            .network(network)
            .host(host)
            .build()
    }

    /// Build a ready-to-dispatch worker: controller plus runtime cache.
    pub fn into_worker(
        self,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Result<ServiceWorker> {
        let runtime = RuntimeCache::new(self.runtime_rules()?);
        let controller = self.build_controller(storage, network, host)?;
        Ok(ServiceWorker::with_runtime_cache(
            Arc::new(controller),
            runtime,
        ))
    }
}
