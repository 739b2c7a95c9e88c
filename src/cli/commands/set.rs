//! Set command implementation.
//!
//! The `nsplan set` command points one interface at a DNS provider.

use crate::cli::args::SetArgs;
use crate::context::Context;
use crate::dns::provider::CUSTOM_PROVIDER;
use crate::dns::{ProviderCatalog, ResolvedProvider};
use crate::error::{NsplanError, Result};
use crate::netplan::{locate_configuration, LiveDocument, NameserverChange};
use crate::system::detect_target_interface;
use crate::ui::{Prompt, PromptOption, UserInterface};
use crate::updater::{DnsUpdater, UpdateOutcome, UpdatePlan};

use super::dispatcher::{Command, CommandResult};

/// Shown before any command that writes netplan files as a regular user.
pub const NOT_ROOT_WARNING: &str =
    "Not running as root; writing netplan files or running netplan apply may fail.";

/// Ask which provider to use, preselecting `default` when it is known.
pub fn prompt_provider(
    catalog: &ProviderCatalog,
    default: Option<&str>,
    ui: &mut dyn UserInterface,
) -> Result<String> {
    let mut options: Vec<PromptOption> = catalog
        .entries()
        .into_iter()
        .map(|e| PromptOption::new(format!("{} ({})", e.label, e.addresses.join(", ")), e.id))
        .collect();
    options.push(PromptOption::new("Custom addresses", CUSTOM_PROVIDER));

    let preselected = default.and_then(|d| {
        options
            .iter()
            .find(|o| o.value.eq_ignore_ascii_case(d))
            .map(|o| o.value.clone())
    });
    let mut prompt = Prompt::select("provider", "Which DNS provider?", options);
    if let Some(value) = preselected {
        prompt = prompt.with_default(value);
    }
    Ok(ui.prompt(&prompt)?.as_string())
}

/// The set command implementation.
pub struct SetCommand {
    context: Context,
    args: SetArgs,
    default_provider: Option<String>,
}

impl SetCommand {
    /// Create a new set command.
    pub fn new(context: &Context, args: SetArgs, default_provider: Option<String>) -> Self {
        Self {
            context: context.clone(),
            args,
            default_provider,
        }
    }

    fn provider_id(&self, ui: &mut dyn UserInterface) -> Result<String> {
        if let Some(id) = &self.args.provider {
            return Ok(id.clone());
        }
        if !self.args.addresses.is_empty() {
            return Ok(CUSTOM_PROVIDER.to_string());
        }
        if let Some(id) = &self.default_provider {
            return Ok(id.clone());
        }
        if ui.is_interactive() {
            return prompt_provider(&self.context.catalog, None, ui);
        }
        Err(NsplanError::Other(anyhow::anyhow!(
            "No provider given; name one (see `nsplan providers`) or pass --address"
        )))
    }

    fn resolve_provider(&self, ui: &mut dyn UserInterface) -> Result<ResolvedProvider> {
        let id = self.provider_id(ui)?;

        let mut addresses = self.args.addresses.clone();
        if id.eq_ignore_ascii_case(CUSTOM_PROVIDER) && addresses.is_empty() && ui.is_interactive() {
            let answer = ui
                .prompt(&Prompt::input(
                    "addresses",
                    "Nameserver addresses (comma-separated)",
                ))?
                .as_string();
            addresses = answer
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        let provider = self.context.catalog.resolve(&id, &addresses)?;
        tracing::debug!("Resolved provider {} to {:?}", provider.name, provider.addresses);
        Ok(provider)
    }
}

impl Command for SetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = &self.context;

        if !ctx.elevated && !self.args.dry_run {
            ui.warning(NOT_ROOT_WARNING);
        }

        let provider = self.resolve_provider(ui)?;
        let path = locate_configuration(&ctx.netplan_dir, ctx.document(), ui)?;
        let live = LiveDocument::load(&path)?;
        let interface = detect_target_interface(
            &ctx.interface_source(),
            self.args.interface.as_deref(),
            ui,
        )?;

        let plan = UpdatePlan::build(&live, &interface, &provider)?;
        if let NameserverChange::Created { section } = &plan.change {
            if section == "wifis" {
                ui.warning(&format!(
                    "{} is new in {} and has no access-points; netplan will reject it until some are added.",
                    interface.name,
                    path.display()
                ));
            }
        }

        let addresses = provider
            .addresses
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        if self.args.dry_run {
            ui.message(&format!("# {}", path.display()));
            ui.message(plan.candidate_text().trim_end());
            ui.success("Dry run: nothing was changed");
            return Ok(CommandResult::success());
        }

        let stack = ctx.network_stack();
        let mut updater = DnsUpdater::new(&stack, ctx.backup_store());
        match updater.apply(&plan, ui)? {
            UpdateOutcome::Unchanged => {
                ui.success(&format!(
                    "{} already uses {} ({}); nothing to do",
                    interface.name, provider.name, addresses
                ));
            }
            UpdateOutcome::Committed { backup } => {
                ui.success(&format!(
                    "{} now uses {} ({})",
                    interface.name, provider.name, addresses
                ));
                ui.message(&format!(
                    "Previous configuration saved as backup {} (undo with `nsplan restore {}`)",
                    backup.id, backup.id
                ));
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::TestHost;
    use crate::netplan::NetworkConfig;
    use crate::ui::MockUI;
    use std::path::Path;

    const DHCP_DOC: &str = "network:\n  version: 2\n  renderer: networkd\n  ethernets:\n    eth0:\n      dhcp4: true\n      match:\n        macaddress: 52:54:00:12:34:56\n";

    fn args(provider: &str) -> SetArgs {
        SetArgs {
            provider: Some(provider.to_string()),
            ..Default::default()
        }
    }

    fn load(path: &Path) -> NetworkConfig {
        NetworkConfig::parse(&std::fs::read_to_string(path).unwrap(), path).unwrap()
    }

    #[test]
    fn sets_cloudflare_on_only_interface() {
        let host = TestHost::new(&["eth0", "docker0"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::new();

        let result = SetCommand::new(&host.context("true"), args("cloudflare"), None)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_success("eth0 now uses Cloudflare (1.1.1.1, 1.0.0.1)"));

        let eth0 = load(&doc).interface("eth0").unwrap();
        assert_eq!(eth0.nameservers, vec!["1.1.1.1", "1.0.0.1"]);
        assert!(eth0.suppress_dhcp_dns);
        assert!(std::fs::read_to_string(&doc).unwrap().contains("macaddress"));
    }

    #[test]
    fn empty_netplan_dir_gets_new_document() {
        let host = TestHost::new(&["enp3s0"]);
        let mut ui = MockUI::new();

        SetCommand::new(&host.context("true"), args("quad9"), None)
            .execute(&mut ui)
            .unwrap();

        let doc = host.netplan_dir().join("01-netcfg.yaml");
        let config = load(&doc);
        assert_eq!(config.version(), Some(2));
        let entry = config.interface("enp3s0").unwrap();
        assert_eq!(entry.section, "ethernets");
        assert!(entry.dhcp4);
        assert_eq!(entry.nameservers, vec!["9.9.9.9", "149.112.112.112"]);
    }

    #[test]
    fn dry_run_changes_nothing() {
        let host = TestHost::new(&["eth0"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::new();

        let set = SetArgs {
            dry_run: true,
            ..args("google")
        };
        SetCommand::new(&host.context("false"), set, None)
            .execute(&mut ui)
            .unwrap();

        assert_eq!(std::fs::read_to_string(&doc).unwrap(), DHCP_DOC);
        assert!(ui.has_message("8.8.8.8"));
        assert!(!host.backup_dir().exists());
    }

    #[test]
    fn addresses_imply_custom_provider() {
        let host = TestHost::new(&["eth0"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::new();

        let set = SetArgs {
            addresses: vec!["10.0.0.53".into(), "10.0.0.53".into(), "10.0.1.53".into()],
            ..Default::default()
        };
        SetCommand::new(&host.context("true"), set, None)
            .execute(&mut ui)
            .unwrap();

        let eth0 = load(&doc).interface("eth0").unwrap();
        assert_eq!(eth0.nameservers, vec!["10.0.0.53", "10.0.1.53"]);
    }

    #[test]
    fn invalid_custom_address_is_rejected_before_any_change() {
        let host = TestHost::new(&["eth0"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::new();

        let set = SetArgs {
            addresses: vec!["10.0.0.256".into()],
            ..args("custom")
        };
        let err = SetCommand::new(&host.context("true"), set, None)
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, NsplanError::InvalidAddress { .. }));
        assert_eq!(std::fs::read_to_string(&doc).unwrap(), DHCP_DOC);
    }

    #[test]
    fn default_provider_is_used() {
        let host = TestHost::new(&["eth0"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::new();

        SetCommand::new(
            &host.context("true"),
            SetArgs::default(),
            Some("adguard".to_string()),
        )
        .execute(&mut ui)
        .unwrap();

        let eth0 = load(&doc).interface("eth0").unwrap();
        assert_eq!(eth0.nameservers, vec!["94.140.14.14", "94.140.15.15"]);
    }

    #[test]
    fn missing_provider_without_terminal_fails() {
        let host = TestHost::new(&["eth0"]);
        let mut ui = MockUI::new();
        let err = SetCommand::new(&host.context("true"), SetArgs::default(), None)
            .execute(&mut ui)
            .unwrap_err();
        assert!(err.to_string().contains("No provider given"));
    }

    #[test]
    fn interactive_prompts_for_provider_and_interface() {
        let host = TestHost::new(&["eth0", "eth1"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::interactive();
        ui.set_prompt_response("provider", "custom");
        ui.set_prompt_response("addresses", "192.168.1.1, 192.168.1.2");
        ui.set_prompt_response("interface", "eth1");

        SetCommand::new(&host.context("true"), SetArgs::default(), None)
            .execute(&mut ui)
            .unwrap();

        assert_eq!(ui.prompts_shown(), &["provider", "addresses", "interface"]);
        let eth1 = load(&doc).interface("eth1").unwrap();
        assert_eq!(eth1.nameservers, vec!["192.168.1.1", "192.168.1.2"]);
    }

    #[test]
    fn validation_failure_keeps_document() {
        let host = TestHost::new(&["eth0"]);
        let doc = host.write_document("01-netcfg.yaml", DHCP_DOC);
        let mut ui = MockUI::new();

        let err = SetCommand::new(&host.context("false"), args("cloudflare"), None)
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, NsplanError::ValidationFailed { .. }));
        assert_eq!(err.exit_code(), 6);
        assert_eq!(std::fs::read_to_string(&doc).unwrap(), DHCP_DOC);
    }

    #[test]
    fn repeated_set_reports_nothing_to_do() {
        let host = TestHost::new(&["eth0"]);
        host.write_document("01-netcfg.yaml", DHCP_DOC);
        let ctx = host.context("true");

        SetCommand::new(&ctx, args("cloudflare"), None)
            .execute(&mut MockUI::new())
            .unwrap();

        let mut ui = MockUI::new();
        SetCommand::new(&ctx, args("cloudflare"), None)
            .execute(&mut ui)
            .unwrap();
        assert!(ui.has_success("nothing to do"));
    }

    #[test]
    fn new_wifi_entry_warns_about_access_points() {
        let host = TestHost::new(&["wlan0"]);
        let mut ui = MockUI::new();

        SetCommand::new(&host.context("true"), args("cloudflare"), None)
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_warning("access-points"));
    }

    #[test]
    fn warns_when_not_root() {
        let host = TestHost::new(&["eth0"]);
        let mut ctx = host.context("true");
        ctx.elevated = false;
        let mut ui = MockUI::new();

        SetCommand::new(&ctx, args("cloudflare"), None)
            .execute(&mut ui)
            .unwrap();
        assert!(ui.has_warning("Not running as root"));
    }
}
