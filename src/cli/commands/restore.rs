//! Restore command implementation.
//!
//! The `nsplan restore` command makes a stored backup live again.

use crate::cli::args::RestoreArgs;
use crate::context::Context;
use crate::error::Result;
use crate::ui::{Prompt, UserInterface};
use crate::updater::DnsUpdater;

use super::dispatcher::{Command, CommandResult};
use super::set::NOT_ROOT_WARNING;

/// The restore command implementation.
pub struct RestoreCommand {
    context: Context,
    args: RestoreArgs,
}

impl RestoreCommand {
    /// Create a new restore command.
    pub fn new(context: &Context, args: RestoreArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for RestoreCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = &self.context;
        let store = ctx.backup_store();
        let record = store.get(&self.args.id)?;

        if ui.is_interactive() && !self.args.yes {
            let question = format!(
                "Restore backup {} over {}?",
                record.id,
                record.source.display()
            );
            let confirmed = ui
                .prompt(&Prompt::confirm("confirm_restore", &question, true))?
                .as_bool()
                .unwrap_or(false);
            if !confirmed {
                ui.message("Restore cancelled");
                return Ok(CommandResult::success());
            }
        }

        if !ctx.elevated {
            ui.warning(NOT_ROOT_WARNING);
        }

        let stack = ctx.network_stack();
        let mut updater = DnsUpdater::new(&stack, store);
        let outcome = updater.restore(record.id.as_str(), ui)?;

        ui.success(&format!(
            "Restored {} from backup {}",
            outcome.restored.source.display(),
            outcome.restored.id
        ));
        ui.message(&format!(
            "The replaced document was saved as backup {}",
            outcome.previous.id
        ));
        Ok(CommandResult::success())
    }
}
