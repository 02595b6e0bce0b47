//! Cache lifecycle controller

mod builder;
mod lifecycle;
mod outcome;
mod writeback;

pub use builder::CacheControllerBuilder;
pub use lifecycle::CacheController;
pub use outcome::{ActivationReport, FetchOutcome, InstallReport};
