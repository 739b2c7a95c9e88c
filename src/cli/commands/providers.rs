//! Providers command implementation.
//!
//! The `nsplan providers` command lists the DNS providers `set` accepts.

use crate::cli::args::ProvidersArgs;
use crate::context::Context;
use crate::dns::provider::CUSTOM_PROVIDER;
use crate::error::{NsplanError, Result};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The providers command implementation.
pub struct ProvidersCommand {
    context: Context,
    args: ProvidersArgs,
}

impl ProvidersCommand {
    /// Create a new providers command.
    pub fn new(context: &Context, args: ProvidersArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for ProvidersCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let entries = self.context.catalog.entries();

        if self.args.json {
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| NsplanError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["ID", "NAME", "ADDRESSES"]);
        for entry in &entries {
            table.add_row([entry.id.clone(), entry.label.clone(), entry.addresses.join(", ")]);
        }
        table.add_row([
            CUSTOM_PROVIDER.to_string(),
            "Custom".to_string(),
            "given with --address".to_string(),
        ]);

        for line in table.render_lines() {
            ui.message(&line);
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextOverrides;
    use crate::settings::Settings;
    use crate::ui::MockUI;

    fn context_with_preset() -> Context {
        let mut settings = Settings::default();
        settings
            .providers
            .insert("office".to_string(), vec!["10.0.0.53".to_string()]);
        Context::new(&settings, ContextOverrides::default(), false, false)
    }

    #[test]
    fn table_includes_builtins_presets_and_custom() {
        let mut ui = MockUI::new();
        ProvidersCommand::new(&context_with_preset(), ProvidersArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("1.1.1.1, 1.0.0.1"));
        assert!(ui.has_message("149.112.112.112"));
        assert!(ui.has_message("office"));
        assert!(ui
            .messages()
            .last()
            .is_some_and(|l| l.starts_with("custom")));
    }

    #[test]
    fn json_lists_every_entry() {
        let mut ui = MockUI::new();
        ProvidersCommand::new(&context_with_preset(), ProvidersArgs { json: true })
            .execute(&mut ui)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        let ids: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["cloudflare", "google", "quad9", "opendns", "adguard", "nextdns", "office"]
        );
    }
}
