//! Command-line interface for nsplan.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`report`] - Failure reporting shared by every command

pub mod args;
pub mod commands;
pub mod report;

pub use args::{
    BackupsArgs, Cli, Commands, CompletionsArgs, ProvidersArgs, RestoreArgs, SetArgs, ShowArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use report::report_error;
