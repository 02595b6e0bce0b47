//! In-process cache storage.
//!
//! [`MemoryCacheStorage`] implements the host storage traits without a
//! browser: a name index of [`MemoryCacheStore`]s, each backed by an
//! unbounded moka cache. Per-key reads and writes never contend on a
//! global lock; only opening and deleting stores touch the index.
//!
//! `add_all` fetches through the injected [`Network`] and commits nothing
//! unless every request succeeds, so a failed install leaves no partial
//! entries behind.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use moka::future::Cache;
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::{CacheStorage, CacheStore, Network};
use crate::types::{Request, RequestKey, ResponseSnapshot};
use crate::{PrecacheError, Result};

/// Named stores kept in process memory.
pub struct MemoryCacheStorage {
    // Creation order is preserved so `keys()` is stable.
    stores: RwLock<Vec<Arc<MemoryCacheStore>>>,
    network: Arc<dyn Network>,
}

impl MemoryCacheStorage {
    /// Create empty storage; `network` serves `add_all` fetches.
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self {
            stores: RwLock::new(Vec::new()),
            network,
        }
    }

    /// Get an existing store without creating it.
    pub async fn get(&self, name: &str) -> Option<Arc<MemoryCacheStore>> {
        self.stores
            .read()
            .await
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>> {
        if let Some(store) = self.get(name).await {
            return Ok(store);
        }

        let mut stores = self.stores.write().await;
        // Re-check: another open may have raced us between the locks.
        if let Some(existing) = stores.iter().find(|s| s.name == name) {
            let store: Arc<MemoryCacheStore> = Arc::clone(existing);
            return Ok(store);
        }
        debug!(cache = name, "creating cache store");
        let store = Arc::new(MemoryCacheStore::new(name, Arc::clone(&self.network)));
        stores.push(Arc::clone(&store));
        Ok(store)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .stores
            .read()
            .await
            .iter()
            .map(|s| s.name.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut stores = self.stores.write().await;
        let before = stores.len();
        stores.retain(|s| s.name != name);
        Ok(stores.len() != before)
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.get(name).await.is_some())
    }
}

/// One named store.
pub struct MemoryCacheStore {
    name: String,
    entries: Cache<RequestKey, ResponseSnapshot>,
    network: Arc<dyn Network>,
}

impl MemoryCacheStore {
    fn new(name: &str, network: Arc<dyn Network>) -> Self {
        Self {
            name: name.to_string(),
            entries: Cache::builder().build(),
            network,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>> {
        Ok(self.entries.get(key).await)
    }

    async fn put(&self, key: RequestKey, snapshot: ResponseSnapshot) -> Result<()> {
        if *key.method() != Method::GET {
            return Err(PrecacheError::InvalidInput(format!(
                "only GET requests can be cached, got {key}"
            )));
        }
        self.entries.insert(key, snapshot).await;
        Ok(())
    }

    async fn add_all(&self, requests: &[Request]) -> Result<()> {
        let fetched = try_join_all(requests.iter().map(|request| async move {
            let response = self.network.fetch(request).await?;
            if !response.is_ok() {
                return Err(PrecacheError::AssetFetch {
                    url: request.url().to_string(),
                    status: response.status().as_u16(),
                });
            }
            Ok::<_, PrecacheError>((request.key(), ResponseSnapshot::from(response)))
        }))
        .await?;

        for (key, snapshot) in fetched {
            self.put(key, snapshot).await?;
        }
        debug!(cache = %self.name, entries = requests.len(), "bulk insert committed");
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        Ok(self.entries.iter().map(|(k, _)| (*k).clone()).collect())
    }
}
