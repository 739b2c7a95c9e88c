//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::context::ContextOverrides;
use crate::ui::OutputMode;

/// nsplan - Point netplan interfaces at a DNS provider, safely.
#[derive(Debug, Parser)]
#[command(name = "nsplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file (merged over /etc/nsplan and the user settings)
    #[arg(short, long, global = true, env = "NSPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding netplan documents
    #[arg(long, global = true)]
    pub netplan_dir: Option<PathBuf>,

    /// Directory for backups
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Netplan document to edit (relative to the netplan directory)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Never prompt; fail when a choice is required
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output mode from flags, falling back to the configured default.
    pub fn output_mode(&self, default: OutputMode) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            default
        }
    }

    pub fn context_overrides(&self) -> ContextOverrides {
        ContextOverrides {
            netplan_dir: self.netplan_dir.clone(),
            backup_dir: self.backup_dir.clone(),
            document: self.file.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Point an interface at a DNS provider
    Set(SetArgs),

    /// Show the netplan configuration
    Show(ShowArgs),

    /// Restore a backup
    Restore(RestoreArgs),

    /// List backups
    Backups(BackupsArgs),

    /// List DNS providers
    Providers(ProvidersArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `set` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SetArgs {
    /// Provider (cloudflare, google, quad9, opendns, adguard, nextdns,
    /// a preset from the settings file, or custom)
    pub provider: Option<String>,

    /// Nameserver address for the custom provider (repeatable, or comma-separated)
    #[arg(short, long = "address", value_name = "IPV4", value_delimiter = ',')]
    pub addresses: Vec<String>,

    /// Interface to configure (skips detection)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Print the resulting document without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long, conflicts_with = "raw")]
    pub json: bool,

    /// Print the document exactly as stored
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the `restore` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RestoreArgs {
    /// Backup id, or "latest"
    #[arg(default_value = "latest")]
    pub id: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl Default for RestoreArgs {
    fn default() -> Self {
        Self {
            id: crate::backup::LATEST.to_string(),
            yes: false,
        }
    }
}

/// Arguments for the `backups` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BackupsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `providers` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProvidersArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
