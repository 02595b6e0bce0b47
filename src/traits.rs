//! Host runtime traits consumed by the controller.
//!
//! The controller never talks to a browser, a filesystem or a socket
//! directly. Every side effect goes through one of these seams, so the
//! same decision logic runs against the in-process implementations in
//! [`cache::memory`](crate::cache::memory) and [`network`](crate::network),
//! against a wasm binding, or against counting fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::{Request, RequestKey, Response, ResponseSnapshot};

// ============================================================================
// Cache storage
// ============================================================================

/// Durable registry of named cache stores.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the store called `name`, creating it if absent.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>>;

    /// Names of every existing store.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete the store called `name`. Returns `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Whether a store called `name` exists.
    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.keys().await?.iter().any(|k| k == name))
    }
}

/// One named store mapping request identities to response snapshots.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    /// Look up the snapshot stored under `key`.
    async fn match_request(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>>;

    /// Store `snapshot` under `key`, replacing any earlier entry.
    async fn put(&self, key: RequestKey, snapshot: ResponseSnapshot) -> Result<()>;

    /// Fetch every request and store the responses.
    ///
    /// Fails if any fetch fails or returns a non-ok status.
    async fn add_all(&self, requests: &[Request]) -> Result<()>;

    /// Identities of every stored entry.
    async fn keys(&self) -> Result<Vec<RequestKey>>;
}

// ============================================================================
// Network
// ============================================================================

/// The real network, as seen from the background context.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. Transport failures are errors; HTTP error
    /// statuses are ordinary responses.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

// ============================================================================
// Worker host
// ============================================================================

/// Lifecycle hooks offered by the host runtime.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Activate without waiting for existing clients to release control.
    async fn skip_waiting(&self) -> Result<()>;

    /// Take control of all open client pages immediately.
    async fn claim_clients(&self) -> Result<()>;
}

/// Host with no pages to claim and no waiting period to skip.
///
/// Default for controllers driven directly by a process rather than a
/// browser runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

#[async_trait]
impl WorkerHost for DetachedHost {
    async fn skip_waiting(&self) -> Result<()> {
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        Ok(())
    }
}
