//! Nameserver updates and restores.
//!
//! - [`phase`] - the `Idle → Validating → Committed | RolledBack` machine
//! - [`workflow`] - planning, backup, validation, commit and rollback

pub mod phase;
pub mod workflow;

pub use phase::{PhaseTracker, UpdatePhase};
pub use workflow::{DnsUpdater, RestoreOutcome, UpdateOutcome, UpdatePlan};
