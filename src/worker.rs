//! Event adapter binding a [`CacheController`] to a host's event model.
//!
//! The host dispatches `install`, `activate` and `fetch`; the adapter
//! tracks the generation's lifecycle state, forwards each event to the
//! controller, and turns a [`FetchOutcome`] into something the host can
//! deliver. Requests the controller passes through get one more chance
//! at the declarative [`RuntimeCache`] before falling through to the
//! host's default fetch.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::cache::RuntimeCache;
use crate::controller::{ActivationReport, CacheController, FetchOutcome, InstallReport};
use crate::types::{Request, Response};
use crate::{PrecacheError, Result};

/// Lifecycle state of one controller generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Registered, no event dispatched yet.
    Parsed,
    /// Install event in progress.
    Installing,
    /// Install succeeded; waiting to activate.
    Installed,
    /// Activate event in progress.
    Activating,
    /// Controlling pages and intercepting fetches.
    Activated,
    /// Install failed or a newer generation took over.
    Redundant,
}

impl WorkerState {
    /// Whether fetch events are intercepted in this state.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// What the host should do with an intercepted request.
#[derive(Debug)]
pub enum FetchResponse {
    /// Deliver this response to the page.
    Respond(Response),
    /// Let the host perform its default network fetch.
    Fallthrough,
}

impl FetchResponse {
    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchResponse::Respond(response) => Some(response),
            FetchResponse::Fallthrough => None,
        }
    }
}

/// One controller generation as seen by the host.
pub struct ServiceWorker {
    controller: Arc<CacheController>,
    runtime: RuntimeCache,
    state: Mutex<WorkerState>,
}

impl ServiceWorker {
    pub fn new(controller: Arc<CacheController>) -> Self {
        Self::with_runtime_cache(controller, RuntimeCache::new(Vec::new()))
    }

    pub fn with_runtime_cache(controller: Arc<CacheController>, runtime: RuntimeCache) -> Self {
        Self {
            controller,
            runtime,
            state: Mutex::new(WorkerState::Parsed),
        }
    }

    pub fn controller(&self) -> &Arc<CacheController> {
        &self.controller
    }

    pub fn runtime_cache(&self) -> &RuntimeCache {
        &self.runtime
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `expected → next` atomically, or fail with the actual state.
    fn transition(&self, expected: WorkerState, next: WorkerState) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != expected {
            return Err(PrecacheError::InvalidState {
                expected,
                actual: *state,
            });
        }
        debug!(from = %expected, to = %next, version = %self.controller.version(), "state change");
        *state = next;
        Ok(())
    }

    /// Dispatch the install event.
    ///
    /// On failure the generation becomes redundant and never activates. A
    /// generation superseded while installing stays redundant; the install
    /// then reports [`PrecacheError::InvalidState`].
    pub async fn handle_install(&self) -> Result<InstallReport> {
        self.transition(WorkerState::Parsed, WorkerState::Installing)?;
        match self.controller.on_install().await {
            Ok(report) => {
                self.transition(WorkerState::Installing, WorkerState::Installed)?;
                Ok(report)
            }
            Err(e) => {
                // Already redundant if superseded meanwhile.
                let _ = self.transition(WorkerState::Installing, WorkerState::Redundant);
                Err(e)
            }
        }
    }

    /// Dispatch the activate event.
    ///
    /// The generation ends up activated even if cleanup could not list the
    /// existing stores; that error is still returned. A generation
    /// superseded while activating stays redundant.
    pub async fn handle_activate(&self) -> Result<ActivationReport> {
        self.transition(WorkerState::Installed, WorkerState::Activating)?;
        let result = self.controller.on_activate().await;
        self.transition(WorkerState::Activating, WorkerState::Activated)?;
        if let Err(e) = &result {
            warn!(error = %e, "activation cleanup failed");
        } else {
            info!(cache = %self.controller.cache_name(), "generation activated");
        }
        result
    }

    /// Dispatch a fetch event.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchResponse> {
        if !self.state().can_intercept_fetch() {
            return Ok(FetchResponse::Fallthrough);
        }

        match self.controller.on_fetch(request).await? {
            FetchOutcome::Cached(snapshot) => Ok(FetchResponse::Respond(snapshot.to_response())),
            FetchOutcome::Network(response) => Ok(FetchResponse::Respond(response)),
            FetchOutcome::Passthrough => {
                let network = self.controller.network();
                match self.runtime.handle(request, network.as_ref()).await? {
                    Some(response) => Ok(FetchResponse::Respond(response)),
                    None => Ok(FetchResponse::Fallthrough),
                }
            }
        }
    }

    /// Mark this generation as superseded by a newer one.
    ///
    /// Redundant is terminal: no later transition leaves it.
    pub fn supersede(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *state;
        if from != WorkerState::Redundant {
            debug!(
                %from,
                to = %WorkerState::Redundant,
                version = %self.controller.version(),
                "state change"
            );
            *state = WorkerState::Redundant;
        }
    }
}
