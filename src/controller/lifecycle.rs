//! The cache lifecycle controller: install, activate, fetch.

use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::Method;
use tracing::{debug, info, warn};
use url::{Origin, Url};

use super::builder::CacheControllerBuilder;
use super::outcome::{ActivationReport, FetchOutcome, InstallReport};
use super::writeback::WriteBackSet;
use crate::telemetry;
use crate::traits::{CacheStorage, CacheStore, Network, WorkerHost};
use crate::types::{AssetManifest, CacheName, CacheNaming, Request, VersionToken};
use crate::{PrecacheError, Result};

/// One controller generation.
///
/// Holds the version, asset list and scope for a single deployed build,
/// plus handles to the host's storage, network and lifecycle hooks.
pub struct CacheController {
    version: VersionToken,
    naming: CacheNaming,
    cache_name: CacheName,
    assets: AssetManifest,
    scope: Url,
    origin: Origin,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    write_backs: WriteBackSet,
}

impl CacheController {
    /// Create a new builder for configuring the controller.
    pub fn builder() -> CacheControllerBuilder {
        CacheControllerBuilder::new()
    }

    pub(crate) fn new(
        version: VersionToken,
        naming: CacheNaming,
        assets: AssetManifest,
        scope: Url,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Self {
        let cache_name = naming.cache_name(&version);
        let origin = scope.origin();
        Self {
            version,
            naming,
            cache_name,
            assets,
            scope,
            origin,
            storage,
            network,
            host,
            write_backs: WriteBackSet::new(),
        }
    }

    pub fn version(&self) -> &VersionToken {
        &self.version
    }

    /// The one cache name that is current for this generation.
    pub fn cache_name(&self) -> &CacheName {
        &self.cache_name
    }

    pub fn naming(&self) -> &CacheNaming {
        &self.naming
    }

    pub fn assets(&self) -> &AssetManifest {
        &self.assets
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub(crate) fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    // ===== Install =====

    /// Pre-cache the full asset list into the current store.
    ///
    /// Asks the host to skip the waiting period, then bulk-inserts every
    /// asset. Any asset that cannot be fetched fails the whole install;
    /// the caller must leave this generation uninstalled.
    pub async fn on_install(&self) -> Result<InstallReport> {
        info!(
            version = %self.version,
            cache = %self.cache_name,
            assets = self.assets.len(),
            "install started"
        );

        if let Err(e) = self.host.skip_waiting().await {
            warn!(error = %e, "skip_waiting failed; generation will wait for clients");
        }

        match self.precache().await {
            Ok(assets) => {
                metrics::counter!(telemetry::INSTALLS_TOTAL, "status" => "ok").increment(1);
                metrics::counter!(telemetry::INSTALL_ASSETS_TOTAL).increment(assets as u64);
                info!(cache = %self.cache_name, assets, "install complete");
                Ok(InstallReport {
                    cache: self.cache_name.clone(),
                    assets,
                })
            }
            Err(e) => {
                metrics::counter!(telemetry::INSTALLS_TOTAL, "status" => "error").increment(1);
                warn!(cache = %self.cache_name, error = %e, "install failed");
                Err(PrecacheError::Install {
                    cache: self.cache_name.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    async fn precache(&self) -> Result<usize> {
        let requests = self.assets.resolve(&self.scope)?;
        let store = self.storage.open(self.cache_name.as_str()).await?;
        store.add_all(&requests).await?;
        Ok(requests.len())
    }

    // ===== Activate =====

    /// Claim all clients, then delete every stale generation's store.
    ///
    /// Only stores inside this controller's naming scheme are candidates.
    /// Deletions run independently; failures land in the report.
    pub async fn on_activate(&self) -> Result<ActivationReport> {
        let clients_claimed = match self.host.claim_clients().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "claim_clients failed");
                false
            }
        };

        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| self.naming.owns(name) && self.cache_name != name.as_str())
            .collect();

        let results = join_all(stale.iter().map(|name| self.storage.delete(name))).await;

        let mut report = ActivationReport {
            clients_claimed,
            ..Default::default()
        };
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(_) => {
                    debug!(cache = %name, "stale cache deleted");
                    metrics::counter!(telemetry::STALE_CACHES_DELETED_TOTAL, "status" => "ok")
                        .increment(1);
                    report.deleted.push(name);
                }
                Err(e) => {
                    warn!(cache = %name, error = %e, "failed to delete stale cache");
                    metrics::counter!(telemetry::STALE_CACHES_DELETED_TOTAL, "status" => "error")
                        .increment(1);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        info!(
            cache = %self.cache_name,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "activation complete"
        );
        Ok(report)
    }

    // ===== Fetch =====

    /// Decide how to answer one intercepted request.
    ///
    /// Non-GET and cross-origin requests pass through untouched. Otherwise
    /// the current store is consulted first; on a miss the network answers
    /// and an eligible response is written back in the background.
    /// Transport failures propagate as errors.
    pub async fn on_fetch(&self, request: &Request) -> Result<FetchOutcome> {
        if *request.method() != Method::GET {
            metrics::counter!(telemetry::PASSTHROUGH_TOTAL, "reason" => "method").increment(1);
            return Ok(FetchOutcome::Passthrough);
        }
        if !request.is_same_origin(&self.origin) {
            metrics::counter!(telemetry::PASSTHROUGH_TOTAL, "reason" => "cross_origin")
                .increment(1);
            return Ok(FetchOutcome::Passthrough);
        }

        let key = request.key();
        let store = self.existing_current().await;

        if let Some(store) = &store {
            match store.match_request(&key).await {
                Ok(Some(snapshot)) => {
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                    debug!(request = %key, "cache hit");
                    return Ok(FetchOutcome::Cached(snapshot));
                }
                Ok(None) => {}
                Err(e) => warn!(request = %key, error = %e, "cache lookup failed"),
            }
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        debug!(request = %key, "cache miss");

        let response = self.network.fetch(request).await?;

        if !response.is_write_back_eligible() {
            debug!(
                request = %key,
                status = response.status().as_u16(),
                response_type = ?response.response_type(),
                "response not eligible for write-back"
            );
            return Ok(FetchOutcome::Network(response));
        }

        let store = match store {
            Some(store) => Some(store),
            None => self.open_current().await,
        };
        if let Some(store) = store {
            let copy = response.duplicate();
            self.write_backs.spawn(store, key, copy.into()).await;
        }
        Ok(FetchOutcome::Network(response))
    }

    /// The current store if it already exists. Lookups never create it;
    /// a storage failure degrades to network-only.
    async fn existing_current(&self) -> Option<Arc<dyn CacheStore>> {
        match self.storage.has(self.cache_name.as_str()).await {
            Ok(true) => self.open_current().await,
            Ok(false) => None,
            Err(e) => {
                warn!(cache = %self.cache_name, error = %e, "failed to list caches");
                None
            }
        }
    }

    /// Open (or create) the current store; a failure degrades to
    /// network-only.
    async fn open_current(&self) -> Option<Arc<dyn CacheStore>> {
        match self.storage.open(self.cache_name.as_str()).await {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(cache = %self.cache_name, error = %e, "failed to open cache");
                None
            }
        }
    }

    // ===== Write-backs =====

    /// Write-backs spawned and not yet reaped.
    pub async fn pending_write_backs(&self) -> usize {
        self.write_backs.pending().await
    }

    /// Wait until every outstanding write-back has finished.
    pub async fn drain_write_backs(&self) {
        self.write_backs.drain().await;
    }
}
