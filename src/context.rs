//! Immutable run context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backup::BackupStore;
use crate::dns::ProviderCatalog;
use crate::settings::Settings;
use crate::system::{NetplanStack, SysfsInterfaces};

/// Everything one nsplan invocation needs to know about the host.
///
/// Built once from merged [`Settings`] and command-line overrides, then
/// passed by reference to every operation.
#[derive(Debug, Clone)]
pub struct Context {
    pub netplan_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub sysfs_net_dir: PathBuf,
    pub netplan_command: String,
    pub validate_timeout: Duration,
    pub apply_timeout: Duration,
    /// Explicitly selected document, relative to `netplan_dir` unless absolute.
    pub document: Option<PathBuf>,
    pub interactive: bool,
    pub elevated: bool,
    pub catalog: ProviderCatalog,
}

/// Command-line values that take precedence over settings.
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub netplan_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

impl Context {
    pub fn new(
        settings: &Settings,
        overrides: ContextOverrides,
        interactive: bool,
        elevated: bool,
    ) -> Self {
        Self {
            netplan_dir: overrides
                .netplan_dir
                .unwrap_or_else(|| settings.netplan_dir.clone()),
            backup_dir: overrides
                .backup_dir
                .unwrap_or_else(|| settings.backup_dir.clone()),
            sysfs_net_dir: settings.sysfs_net_dir.clone(),
            netplan_command: settings.netplan_command.clone(),
            validate_timeout: Duration::from_secs(settings.validate_timeout_secs),
            apply_timeout: Duration::from_secs(settings.apply_timeout_secs),
            document: overrides.document,
            interactive,
            elevated,
            catalog: ProviderCatalog::with_presets(settings.providers.clone()),
        }
    }

    /// The explicitly selected document, if any.
    pub fn document(&self) -> Option<&Path> {
        self.document.as_deref()
    }

    pub fn backup_store(&self) -> BackupStore {
        BackupStore::new(&self.backup_dir)
    }

    pub fn network_stack(&self) -> NetplanStack {
        NetplanStack::new(
            &self.netplan_command,
            &self.netplan_dir,
            &self.backup_dir,
            self.validate_timeout,
            self.apply_timeout,
        )
    }

    pub fn interface_source(&self) -> SysfsInterfaces {
        SysfsInterfaces::new(&self.sysfs_net_dir)
    }
}
