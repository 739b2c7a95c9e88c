//! Settings file schema and resolved settings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ui::OutputMode;

pub const DEFAULT_NETPLAN_DIR: &str = "/etc/netplan";
pub const DEFAULT_BACKUP_DIR: &str = "/var/backups/nsplan";
pub const DEFAULT_SYSFS_NET_DIR: &str = "/sys/class/net";
pub const DEFAULT_NETPLAN_COMMAND: &str = "netplan";
pub const DEFAULT_VALIDATE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_APPLY_TIMEOUT_SECS: u64 = 60;

/// One settings layer as written in a `config.yml`.
///
/// Every key is optional; unset keys leave lower layers in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub netplan_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub sysfs_net_dir: Option<PathBuf>,
    pub netplan_command: Option<String>,
    pub validate_timeout_secs: Option<u64>,
    pub apply_timeout_secs: Option<u64>,
    pub default_provider: Option<String>,
    pub default_output: Option<OutputMode>,

    /// Named presets: name → nameserver addresses.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, Vec<String>>,
}

/// Fully merged settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub netplan_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub sysfs_net_dir: PathBuf,
    pub netplan_command: String,
    pub validate_timeout_secs: u64,
    pub apply_timeout_secs: u64,
    pub default_provider: Option<String>,
    pub default_output: OutputMode,
    pub providers: BTreeMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            netplan_dir: PathBuf::from(DEFAULT_NETPLAN_DIR),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            sysfs_net_dir: PathBuf::from(DEFAULT_SYSFS_NET_DIR),
            netplan_command: DEFAULT_NETPLAN_COMMAND.to_string(),
            validate_timeout_secs: DEFAULT_VALIDATE_TIMEOUT_SECS,
            apply_timeout_secs: DEFAULT_APPLY_TIMEOUT_SECS,
            default_provider: None,
            default_output: OutputMode::Normal,
            providers: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Overlay `layer` on top of these settings.
    ///
    /// Presets merge by name; a later layer replaces a preset of the same name.
    pub fn merge(&mut self, layer: SettingsFile) {
        if let Some(v) = layer.netplan_dir {
            self.netplan_dir = v;
        }
        if let Some(v) = layer.backup_dir {
            self.backup_dir = v;
        }
        if let Some(v) = layer.sysfs_net_dir {
            self.sysfs_net_dir = v;
        }
        if let Some(v) = layer.netplan_command {
            self.netplan_command = v;
        }
        if let Some(v) = layer.validate_timeout_secs {
            self.validate_timeout_secs = v;
        }
        if let Some(v) = layer.apply_timeout_secs {
            self.apply_timeout_secs = v;
        }
        if layer.default_provider.is_some() {
            self.default_provider = layer.default_provider;
        }
        if let Some(v) = layer.default_output {
            self.default_output = v;
        }
        self.providers.extend(layer.providers);
    }
}
