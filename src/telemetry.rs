//! Telemetry metric name constants.
//!
//! Centralised metric names for precache operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `precache_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `status`: "ok" or "error"
//! - `reason`: why a request was passed through: "method" or "cross_origin"
//! - `cache`: runtime cache name (e.g. "image-cache")

/// Total assets written by successful installs.
pub const INSTALL_ASSETS_TOTAL: &str = "precache_install_assets_total";

/// Total install attempts.
///
/// Labels: `status` ("ok" | "error").
pub const INSTALLS_TOTAL: &str = "precache_installs_total";

/// Total stale cache generations removed during activation.
///
/// Labels: `status` ("ok" | "error").
pub const STALE_CACHES_DELETED_TOTAL: &str = "precache_stale_caches_deleted_total";

/// Total intercepted requests served from the current cache.
pub const CACHE_HITS_TOTAL: &str = "precache_cache_hits_total";

/// Total intercepted requests that missed the current cache.
pub const CACHE_MISSES_TOTAL: &str = "precache_cache_misses_total";

/// Total requests left untouched by the interceptor.
///
/// Labels: `reason` ("method" | "cross_origin").
pub const PASSTHROUGH_TOTAL: &str = "precache_passthrough_total";

/// Total write-backs of network responses into the current cache.
///
/// Labels: `status` ("ok" | "error").
pub const WRITE_BACKS_TOTAL: &str = "precache_write_backs_total";

/// Total runtime-cache hits.
///
/// Labels: `cache`.
pub const RUNTIME_CACHE_HITS_TOTAL: &str = "precache_runtime_cache_hits_total";

/// Total runtime-cache misses.
///
/// Labels: `cache`.
pub const RUNTIME_CACHE_MISSES_TOTAL: &str = "precache_runtime_cache_misses_total";
