//! Public types for the Precache API.

mod manifest;
mod request;
mod response;
mod version;

pub use manifest::{AssetManifest, BuildManifest};
pub use request::{Request, RequestKey};
pub use response::{Response, ResponseSnapshot, ResponseType};
pub use version::{CacheName, CacheNaming, DEFAULT_CACHE_PREFIX, VersionToken};
