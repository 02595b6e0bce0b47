//! Caching subsystem.
//!
//! Two independent pieces:
//!
//! - [`MemoryCacheStorage`]: an in-process implementation of the host
//!   storage traits ([`CacheStorage`](crate::traits::CacheStorage) and
//!   [`CacheStore`](crate::traits::CacheStore)). The controller's
//!   versioned pre-cache stores live here when no browser runtime is
//!   present.
//!
//! - [`RuntimeCache`]: bounded, age-limited caches for third-party
//!   resources, driven by declarative [`RuntimeCacheRule`]s. Consulted by
//!   the [`ServiceWorker`](crate::ServiceWorker) adapter only for requests
//!   the controller passes through.

pub mod memory;
pub mod runtime;

pub use memory::{MemoryCacheStorage, MemoryCacheStore};
pub use runtime::{CacheStrategy, RuntimeCache, RuntimeCacheRule};
