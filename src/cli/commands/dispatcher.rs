//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::context::Context;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// Failures that map to an exit code are returned as errors; the
    /// result only carries codes for outcomes that are not errors.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: Context,
    default_provider: Option<String>,
}

impl CommandDispatcher {
    /// `default_provider` is used by `set` when no provider is named.
    pub fn new(context: Context, default_provider: Option<String>) -> Self {
        Self {
            context,
            default_provider,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Dispatch and execute a command.
    ///
    /// With no subcommand, the interactive menu is shown.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Set(args)) => {
                let cmd = super::set::SetCommand::new(
                    &self.context,
                    args.clone(),
                    self.default_provider.clone(),
                );
                cmd.execute(ui)
            }
            Some(Commands::Show(args)) => {
                let cmd = super::show::ShowCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Restore(args)) => {
                let cmd = super::restore::RestoreCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Backups(args)) => {
                let cmd = super::backups::BackupsCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Providers(args)) => {
                let cmd = super::providers::ProvidersCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd = super::menu::MenuCommand::new(&self.context, self.default_provider.clone());
                cmd.execute(ui)
            }
        }
    }
}
