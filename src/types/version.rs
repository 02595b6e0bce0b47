//! Version tokens and the cache naming scheme derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PrecacheError, Result};

/// Default prefix prepended to the version token to form a cache name.
pub const DEFAULT_CACHE_PREFIX: &str = "cache-";

/// Opaque token identifying one deployed build.
///
/// Supplied by build tooling. Two different builds must produce different
/// tokens; the token is only ever used to derive a [`CacheName`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionToken(String);

impl VersionToken {
    /// Create a token, rejecting empty or whitespace-only input.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(PrecacheError::InvalidVersion(
                "version token must not be empty".to_string(),
            ));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VersionToken {
    type Error = PrecacheError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<VersionToken> for String {
    fn from(token: VersionToken) -> Self {
        token.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of one durable cache store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheName(String);

impl CacheName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CacheName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CacheName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The naming scheme a controller owns: `{prefix}{version}`.
///
/// Stores whose names do not carry the prefix belong to someone else and
/// are never touched by activation cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNaming {
    prefix: String,
}

impl CacheNaming {
    /// Create a naming scheme with a custom prefix.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(PrecacheError::Configuration(
                "cache prefix must not be empty".to_string(),
            ));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derive the cache name for a version.
    pub fn cache_name(&self, version: &VersionToken) -> CacheName {
        CacheName(format!("{}{}", self.prefix, version))
    }

    /// Whether a store name falls under this naming scheme.
    pub fn owns(&self, name: &str) -> bool {
        name.len() > self.prefix.len() && name.starts_with(&self.prefix)
    }
}

impl Default for CacheNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
        }
    }
}
