//! Show command implementation.
//!
//! The `nsplan show` command prints the located netplan document.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::ShowArgs;
use crate::context::Context;
use crate::error::{NsplanError, Result};
use crate::netplan::{locate_configuration, InterfaceEntry, LiveDocument};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Machine-readable form of `nsplan show --json`.
#[derive(Debug, Serialize)]
struct ShowReport {
    document: PathBuf,
    exists: bool,
    version: Option<u64>,
    renderer: Option<String>,
    interfaces: Vec<InterfaceEntry>,
    latest_backup: Option<String>,
}

/// The show command implementation.
pub struct ShowCommand {
    context: Context,
    args: ShowArgs,
}

impl ShowCommand {
    /// Create a new show command.
    pub fn new(context: &Context, args: ShowArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

fn dhcp_label(entry: &InterfaceEntry) -> &'static str {
    match (entry.dhcp4, entry.dhcp6) {
        (true, true) => "v4+v6",
        (true, false) => "v4",
        (false, true) => "v6",
        (false, false) => "no",
    }
}

fn dhcp_dns_label(entry: &InterfaceEntry) -> &'static str {
    if !entry.dhcp4 && !entry.dhcp6 {
        "-"
    } else if entry.suppress_dhcp_dns {
        "ignored"
    } else {
        "used"
    }
}

fn or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = &self.context;
        let path = locate_configuration(&ctx.netplan_dir, ctx.document(), ui)?;
        let live = LiveDocument::load(&path)?;
        let latest = ctx.backup_store().latest()?;

        if self.args.raw {
            match &live.original {
                Some(bytes) => ui.message(String::from_utf8_lossy(bytes).trim_end()),
                None => ui.warning(&format!("{} does not exist yet", path.display())),
            }
            return Ok(CommandResult::success());
        }

        if self.args.json {
            let report = ShowReport {
                document: path.clone(),
                exists: live.exists(),
                version: live.config.version(),
                renderer: live.config.renderer().map(str::to_string),
                interfaces: live.config.interfaces(),
                latest_backup: latest.map(|r| r.id.to_string()),
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| NsplanError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&path.display().to_string());
        if !live.exists() {
            ui.warning("Document does not exist yet; nsplan set will create it");
        }
        ui.message(&format!(
            "version: {}  renderer: {}",
            live.config
                .version()
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
            live.config.renderer().unwrap_or("-")
        ));

        let interfaces = live.config.interfaces();
        if interfaces.is_empty() {
            ui.message("No interfaces configured");
        } else {
            let mut table = Table::new(&["INTERFACE", "SECTION", "DHCP", "NAMESERVERS", "SEARCH", "DHCP DNS"]);
            for entry in &interfaces {
                table.add_row([
                    entry.name.clone(),
                    entry.section.clone(),
                    dhcp_label(entry).to_string(),
                    or_dash(&entry.nameservers),
                    or_dash(&entry.search),
                    dhcp_dns_label(entry).to_string(),
                ]);
            }
            for line in table.render_lines() {
                ui.message(&line);
            }
        }

        match latest {
            Some(record) => ui.message(&format!("Latest backup: {}", record.id)),
            None => ui.message("No backups yet"),
        }

        Ok(CommandResult::success())
    }
}
