//! Pre-cache asset lists supplied by build tooling.

use serde::{Deserialize, Serialize};
use url::Url;

use super::request::Request;
use super::version::VersionToken;
use crate::{PrecacheError, Result};

/// Ordered list of resource locators to pre-cache at install time.
///
/// Locators may be absolute URLs or paths relative to the worker scope.
/// Duplicates are kept as-is; order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Build artifacts emitted by the bundler.
    #[serde(default)]
    pub build: Vec<String>,
    /// Static files copied verbatim.
    #[serde(default)]
    pub files: Vec<String>,
}

impl AssetManifest {
    pub fn new(build: Vec<String>, files: Vec<String>) -> Self {
        Self { build, files }
    }

    /// All locators, build artifacts first.
    pub fn locators(&self) -> impl Iterator<Item = &str> {
        self.build.iter().chain(self.files.iter()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.build.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve every locator against `scope` into a GET request.
    pub fn resolve(&self, scope: &Url) -> Result<Vec<Request>> {
        self.locators()
            .map(|locator| {
                scope
                    .join(locator)
                    .map(|url| Request::new(reqwest::Method::GET, url))
                    .map_err(|e| PrecacheError::InvalidUrl {
                        url: locator.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }
}

/// Manifest emitted by build tooling: a version token plus the asset list.
///
/// ```rust
/// # use precache::BuildManifest;
/// let manifest = BuildManifest::from_json(
///     r#"{"version": "1718000000000", "build": ["/_app/start.js"], "files": ["/favicon.png"]}"#,
/// ).unwrap();
/// assert_eq!(manifest.assets.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub version: VersionToken,
    #[serde(flatten)]
    pub assets: AssetManifest,
}

impl BuildManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
