//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command receives the same
//! [`Context`](crate::context::Context), built once from settings and
//! global flags.

pub mod backups;
pub mod completions;
pub mod dispatcher;
pub mod menu;
pub mod providers;
pub mod restore;
pub mod set;
pub mod show;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
