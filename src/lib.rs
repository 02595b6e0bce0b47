//! Precache - versioned offline cache lifecycle controller
//!
//! This crate implements the cache lifecycle of an offline-capable web
//! client's background worker: a cache store named after the deployed
//! build's version, pre-warmed at install time, garbage-collected at
//! activation, and consulted cache-first for every same-origin GET.
//!
//! All host interaction (cache storage, network, page control) goes through
//! the traits in [`traits`], so the controller runs unchanged against a
//! browser binding, the in-process [`MemoryCacheStorage`] and
//! [`HttpNetwork`], or test fakes.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use precache::{CacheController, HttpNetwork, MemoryCacheStorage, Request, ServiceWorker};
//!
//! #[tokio::main]
//! async fn main() -> precache::Result<()> {
//!     let scope = url::Url::parse("https://app.example/").unwrap();
//!     let network = Arc::new(HttpNetwork::new(&scope)?);
//!     let controller = CacheController::builder()
//!         .version("1718000000000")
//!         .scope(scope.as_str())
//!         .build_assets(["/", "/_app/start.js"])
//!         .static_files(["/favicon.png"])
//!         .storage(Arc::new(MemoryCacheStorage::new(network.clone())))
//!         .network(network)
//!         .build()?;
//!
//!     let worker = ServiceWorker::new(Arc::new(controller));
//!     worker.handle_install().await?;
//!     worker.handle_activate().await?;
//!
//!     let response = worker
//!         .handle_fetch(&Request::get("https://app.example/_app/start.js")?)
//!         .await?;
//!     println!("{:?}", response.into_response().map(|r| r.status()));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod network;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod worker;

// Re-export main types at crate root
pub use cache::{CacheStrategy, MemoryCacheStorage, RuntimeCache, RuntimeCacheRule};
pub use config::{RuntimeCachingConfig, WorkerConfig};
pub use controller::{
    ActivationReport, CacheController, CacheControllerBuilder, FetchOutcome, InstallReport,
};
pub use error::{PrecacheError, Result};
pub use network::HttpNetwork;
pub use traits::{CacheStorage, CacheStore, DetachedHost, Network, WorkerHost};
pub use worker::{FetchResponse, ServiceWorker, WorkerState};

// Re-export all types
pub use types::{
    AssetManifest, BuildManifest, CacheName, CacheNaming, Request, RequestKey, Response,
    ResponseSnapshot, ResponseType, VersionToken,
};
