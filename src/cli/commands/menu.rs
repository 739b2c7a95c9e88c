//! Interactive menu shown when nsplan runs without a subcommand.

use crate::cli::args::{RestoreArgs, SetArgs, ShowArgs};
use crate::cli::report::report_error;
use crate::context::Context;
use crate::error::Result;
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::restore::RestoreCommand;
use super::set::{prompt_provider, SetCommand};
use super::show::ShowCommand;

/// Upper bound on menu rounds, so a scripted UI cannot loop forever.
const MAX_ROUNDS: usize = 100;

/// The menu command implementation.
///
/// Without a terminal there is nobody to ask, so it shows the configuration.
pub struct MenuCommand {
    context: Context,
    default_provider: Option<String>,
}

impl MenuCommand {
    /// Create a new menu command.
    pub fn new(context: &Context, default_provider: Option<String>) -> Self {
        Self {
            context: context.clone(),
            default_provider,
        }
    }

    fn choose(&self, ui: &mut dyn UserInterface) -> Result<String> {
        let options = vec![
            PromptOption::new("Set DNS provider", "set"),
            PromptOption::new("Show configuration", "show"),
            PromptOption::new("Restore latest backup", "restore"),
            PromptOption::new("Quit", "quit"),
        ];
        Ok(ui
            .prompt(&Prompt::select("action", "What would you like to do?", options).with_default("quit"))?
            .as_string())
    }

    fn run_action(&self, action: &str, ui: &mut dyn UserInterface) -> Result<()> {
        match action {
            "set" => {
                let provider = prompt_provider(
                    &self.context.catalog,
                    self.default_provider.as_deref(),
                    ui,
                )?;
                let args = SetArgs {
                    provider: Some(provider),
                    ..Default::default()
                };
                SetCommand::new(&self.context, args, None).execute(ui)?;
            }
            "show" => {
                ShowCommand::new(&self.context, ShowArgs::default()).execute(ui)?;
            }
            "restore" => {
                RestoreCommand::new(&self.context, RestoreArgs::default()).execute(ui)?;
            }
            other => {
                tracing::debug!("Ignoring unknown menu action {}", other);
            }
        }
        Ok(())
    }
}

impl Command for MenuCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !ui.is_interactive() {
            return ShowCommand::new(&self.context, ShowArgs::default()).execute(ui);
        }

        ui.show_header("nsplan");
        // Exit code of the most recent failed action, kept until quit.
        let mut last_failure = None;
        for _ in 0..MAX_ROUNDS {
            let action = self.choose(ui)?;
            if action == "quit" {
                break;
            }
            if let Err(e) = self.run_action(&action, ui) {
                report_error(ui, &e);
                last_failure = Some(e.exit_code());
            }
        }

        Ok(match last_failure {
            Some(code) => CommandResult::failure(i32::from(code)),
            None => CommandResult::success(),
        })
    }
}
