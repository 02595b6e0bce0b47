//! Results of the three lifecycle phases.

use crate::types::{CacheName, Response, ResponseSnapshot};

/// What the interceptor decided for one request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Served from the current cache; no network request was made.
    Cached(ResponseSnapshot),
    /// Fetched from the network after a miss. May or may not have been
    /// scheduled for write-back.
    Network(Response),
    /// Not intercepted: the host should perform its default fetch.
    Passthrough,
}

impl FetchOutcome {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Cached(_) => "cached",
            FetchOutcome::Network(_) => "network",
            FetchOutcome::Passthrough => "passthrough",
        }
    }

    /// The response to deliver, or `None` for passthrough.
    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Cached(snapshot) => Some(snapshot.to_response()),
            FetchOutcome::Network(response) => Some(response),
            FetchOutcome::Passthrough => None,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, FetchOutcome::Passthrough)
    }
}

/// Summary of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache: CacheName,
    /// Number of locators handed to the bulk insert (duplicates included).
    pub assets: usize,
}

/// Summary of an activation.
///
/// Failed deletions are reported, not raised: a leftover stale store only
/// wastes space since nothing reads it again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub clients_claimed: bool,
    pub deleted: Vec<String>,
    /// `(store name, error message)` for each deletion that failed.
    pub failed: Vec<(String, String)>,
}

impl ActivationReport {
    /// Whether every stale store was removed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
