//! Builder for configuring controller instances

use std::sync::Arc;

use url::Url;

use super::CacheController;
use crate::traits::{CacheStorage, DetachedHost, Network, WorkerHost};
use crate::types::{AssetManifest, CacheNaming, DEFAULT_CACHE_PREFIX, VersionToken};
use crate::{PrecacheError, Result};

/// Builder for configuring controller instances.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use precache::{CacheController, HttpNetwork, MemoryCacheStorage};
/// # fn main() -> precache::Result<()> {
/// let scope = "https://app.example/";
/// let network = Arc::new(HttpNetwork::new(&url::Url::parse(scope).unwrap())?);
/// let controller = CacheController::builder()
///     .version("1718000000000")
///     .scope(scope)
///     .build_assets(["/_app/start.js", "/_app/app.css"])
///     .static_files(["/favicon.png", "/robots.txt"])
///     .storage(Arc::new(MemoryCacheStorage::new(network.clone())))
///     .network(network)
///     .build()?;
/// assert_eq!(controller.cache_name().as_str(), "cache-1718000000000");
/// # Ok(())
/// # }
/// ```
pub struct CacheControllerBuilder {
    version: Option<String>,
    cache_prefix: String,
    scope: Option<String>,
    assets: AssetManifest,
    storage: Option<Arc<dyn CacheStorage>>,
    network: Option<Arc<dyn Network>>,
    host: Option<Arc<dyn WorkerHost>>,
}

impl CacheControllerBuilder {
    pub fn new() -> Self {
        Self {
            version: None,
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            scope: None,
            assets: AssetManifest::default(),
            storage: None,
            network: None,
            host: None,
        }
    }

    /// Set the version token the cache name is derived from.
    pub fn version(mut self, token: impl Into<String>) -> Self {
        self.version = Some(token.into());
        self
    }

    /// Override the cache name prefix (default: `cache-`).
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Set the scope URL. Its origin decides which requests are same-origin,
    /// and relative asset locators resolve against it.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Replace the whole asset list.
    pub fn assets(mut self, assets: AssetManifest) -> Self {
        self.assets = assets;
        self
    }

    /// Append build-artifact locators.
    pub fn build_assets<I, S>(mut self, locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets
            .build
            .extend(locators.into_iter().map(Into::into));
        self
    }

    /// Append static-file locators.
    pub fn static_files<I, S>(mut self, locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets
            .files
            .extend(locators.into_iter().map(Into::into));
        self
    }

    /// Set the cache storage backend.
    pub fn storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the network used on cache misses.
    pub fn network(mut self, network: Arc<dyn Network>) -> Self {
        self.network = Some(network);
        self
    }

    /// Set the host lifecycle hooks (default: [`DetachedHost`]).
    pub fn host(mut self, host: Arc<dyn WorkerHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Build the controller.
    pub fn build(self) -> Result<CacheController> {
        let version = VersionToken::new(
            self.version
                .ok_or_else(|| PrecacheError::Configuration("no version token".to_string()))?,
        )?;
        let naming = CacheNaming::new(self.cache_prefix)?;

        let scope_str = self
            .scope
            .ok_or_else(|| PrecacheError::Configuration("no scope URL".to_string()))?;
        let scope = Url::parse(&scope_str).map_err(|e| PrecacheError::InvalidUrl {
            url: scope_str.clone(),
            reason: e.to_string(),
        })?;
        if !scope.origin().is_tuple() {
            return Err(PrecacheError::Configuration(format!(
                "scope {scope_str} has no origin"
            )));
        }

        let storage = self
            .storage
            .ok_or_else(|| PrecacheError::Configuration("no cache storage".to_string()))?;
        let network = self
            .network
            .ok_or_else(|| PrecacheError::Configuration("no network".to_string()))?;
        let host = self.host.unwrap_or_else(|| Arc::new(DetachedHost));

        Ok(CacheController::new(
            version,
            naming,
            self.assets,
            scope,
            storage,
            network,
            host,
        ))
    }
}

impl Default for CacheControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
