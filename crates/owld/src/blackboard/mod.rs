//! Read access to the Blackboard, the job-record store fed by Condor job hooks.
//!
//! Handlers see the Blackboard through the narrow [`JobStore`] trait, which
//! yields the current records; filtering, ordering, and pagination happen in
//! [`query`]. The production store reads a JSON snapshot file on every call so
//! that updates written by the hooks become visible without a restart.

mod errors;
pub mod query;
mod record;
mod store;

pub use self::errors::StoreError;
pub use self::query::{JobQuery, Limit, Workflow, get_entry, list_entries, workflow_entries};
pub use self::record::JobRecord;
pub use self::store::{InMemoryStore, JsonFileStore, UnconfiguredStore, store_from_config};

/// Tracing target for Blackboard access.
pub(crate) const BLACKBOARD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::blackboard");

/// Source of Blackboard records.
pub trait JobStore: Send + Sync {
    /// Every record currently on the Blackboard, in store order.
    fn records(&self) -> Result<Vec<JobRecord>, StoreError>;
}
