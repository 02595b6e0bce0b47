//! Precache error types

use crate::worker::WorkerState;

/// Precache error types
#[derive(Debug, thiserror::Error)]
pub enum PrecacheError {
    // Network errors
    #[error("network error: {0}")]
    Network(String),

    #[error("asset fetch failed for {url}: HTTP {status}")]
    AssetFetch { url: String, status: u16 },

    // Lifecycle errors
    /// Pre-caching the asset list failed; the generation stays uninstalled.
    #[error("install failed for cache '{cache}': {source}")]
    Install {
        cache: String,
        #[source]
        source: Box<PrecacheError>,
    },

    #[error("invalid worker state: expected {expected}, found {actual}")]
    InvalidState {
        expected: WorkerState,
        actual: WorkerState,
    },

    // Storage errors
    #[error("storage error: {0}")]
    Storage(String),

    // Data errors
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid version token: {0}")]
    InvalidVersion(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PrecacheError {
    /// Whether this error came from the network layer (transport or HTTP status).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            PrecacheError::Network(_) | PrecacheError::AssetFetch { .. }
        )
    }
}

impl From<reqwest::Error> for PrecacheError {
    fn from(err: reqwest::Error) -> Self {
        PrecacheError::Network(err.to_string())
    }
}

/// Result type alias for Precache operations
pub type Result<T> = std::result::Result<T, PrecacheError>;
