//! Backups command implementation.
//!
//! The `nsplan backups` command lists stored backups, newest first.

use crate::cli::args::BackupsArgs;
use crate::context::Context;
use crate::error::{NsplanError, Result};
use crate::ui::{format_relative_time, format_size, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The backups command implementation.
pub struct BackupsCommand {
    context: Context,
    args: BackupsArgs,
}

impl BackupsCommand {
    /// Create a new backups command.
    pub fn new(context: &Context, args: BackupsArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for BackupsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.context.backup_store();
        let records = store.list()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| NsplanError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if records.is_empty() {
            ui.message(&format!("No backups in {}", store.dir().display()));
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["ID", "CREATED", "SIZE", "SOURCE"]);
        for record in &records {
            let size = if record.existed {
                format_size(record.size)
            } else {
                "absent".to_string()
            };
            table.add_row([
                record.id.to_string(),
                format_relative_time(record.created_at),
                size,
                record.source.display().to_string(),
            ]);
        }
        for line in table.render_lines() {
            ui.message(&line);
        }

        Ok(CommandResult::success())
    }
}
