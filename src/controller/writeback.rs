//! Tracked fire-and-forget write-backs.
//!
//! The interceptor never waits for a write-back before responding. Each
//! one is spawned onto a [`JoinSet`] owned by the controller generation so
//! callers (tests, shutdown paths) can [`drain()`](WriteBackSet::drain)
//! them deterministically instead of sleeping.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::telemetry;
use crate::traits::CacheStore;
use crate::types::{RequestKey, ResponseSnapshot};

#[derive(Default)]
pub struct WriteBackSet {
    tasks: Mutex<JoinSet<()>>,
}

impl WriteBackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a write-back of `snapshot` under `key` into `store`.
    ///
    /// Failures are logged and counted, never surfaced.
    pub async fn spawn(
        &self,
        store: Arc<dyn CacheStore>,
        key: RequestKey,
        snapshot: ResponseSnapshot,
    ) {
        let mut tasks = self.tasks.lock().await;
        // Reap finished tasks so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            match store.put(key.clone(), snapshot).await {
                Ok(()) => {
                    debug!(cache = store.name(), request = %key, "write-back stored");
                    metrics::counter!(telemetry::WRITE_BACKS_TOTAL, "status" => "ok").increment(1);
                }
                Err(e) => {
                    warn!(cache = store.name(), request = %key, error = %e, "write-back failed");
                    metrics::counter!(telemetry::WRITE_BACKS_TOTAL, "status" => "error")
                        .increment(1);
                }
            }
        });
    }

    /// Number of write-backs spawned and not yet reaped.
    pub async fn pending(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Wait for every outstanding write-back, including ones spawned while
    /// draining.
    pub async fn drain(&self) {
        loop {
            // Take the set out so new spawns are not blocked while we wait.
            let mut tasks = std::mem::take(&mut *self.tasks.lock().await);
            if tasks.is_empty() {
                return;
            }
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "write-back task aborted");
                }
            }
        }
    }
}
