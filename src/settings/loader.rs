//! Settings file discovery and layering.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dns::parse_address;
use crate::dns::provider::CUSTOM_PROVIDER;
use crate::error::{NsplanError, Result};

use super::schema::{Settings, SettingsFile};

/// System-wide settings file.
pub const SYSTEM_SETTINGS_PATH: &str = "/etc/nsplan/config.yml";

/// Settings files in merge order (later overrides earlier).
///
/// 1. System settings (`/etc/nsplan/config.yml`)
/// 2. User settings (`<config dir>/nsplan/config.yml`)
/// 3. Explicit `--config` file
#[derive(Debug, Clone, Default)]
pub struct SettingsPaths {
    pub system: Option<PathBuf>,
    pub user: Option<PathBuf>,
    /// Must exist when given.
    pub explicit: Option<PathBuf>,
}

impl SettingsPaths {
    /// Discover the standard settings locations.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            system: Some(PathBuf::from(SYSTEM_SETTINGS_PATH)).filter(|p| p.exists()),
            user: dirs::config_dir()
                .map(|d| d.join("nsplan").join("config.yml"))
                .filter(|p| p.exists()),
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// Only the explicit file, ignoring system and user settings.
    pub fn explicit_only(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            ..Default::default()
        }
    }

    /// All paths to read, in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        [&self.system, &self.user, &self.explicit]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Parse one settings file.
pub fn load_file(path: &Path) -> Result<SettingsFile> {
    let content = fs::read_to_string(path).map_err(|e| NsplanError::SettingsError {
        message: format!("cannot read {}: {}", path.display(), e),
    })?;

    if content.trim().is_empty() {
        return Ok(SettingsFile::default());
    }

    serde_yaml::from_str(&content).map_err(|e| NsplanError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Build the settings layer contributed by `NSPLAN_*` environment variables.
pub fn env_layer(vars: &HashMap<String, String>) -> Result<SettingsFile> {
    let get = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();
    let seconds = |key: &str| -> Result<Option<u64>> {
        get(key)
            .map(|v| {
                v.trim().parse::<u64>().map_err(|_| NsplanError::SettingsError {
                    message: format!("{} must be a whole number of seconds, got '{}'", key, v),
                })
            })
            .transpose()
    };

    Ok(SettingsFile {
        netplan_dir: get("NSPLAN_NETPLAN_DIR").map(PathBuf::from),
        backup_dir: get("NSPLAN_BACKUP_DIR").map(PathBuf::from),
        sysfs_net_dir: get("NSPLAN_SYSFS_NET_DIR").map(PathBuf::from),
        netplan_command: get("NSPLAN_NETPLAN_COMMAND"),
        validate_timeout_secs: seconds("NSPLAN_VALIDATE_TIMEOUT")?,
        apply_timeout_secs: seconds("NSPLAN_APPLY_TIMEOUT")?,
        default_provider: get("NSPLAN_DEFAULT_PROVIDER"),
        ..Default::default()
    })
}

/// Merge defaults, every settings file and the environment.
pub fn load_settings(paths: &SettingsPaths, env: &HashMap<String, String>) -> Result<Settings> {
    let mut settings = Settings::default();

    for path in paths.all() {
        tracing::debug!("Loading settings from {}", path.display());
        settings.merge(load_file(path)?);
    }
    settings.merge(env_layer(env)?);

    validate(&settings)?;
    Ok(settings)
}

/// Reject settings that would only fail later, mid-update.
pub fn validate(settings: &Settings) -> Result<()> {
    let invalid = |message: String| Err(NsplanError::SettingsError { message });

    if settings.netplan_command.trim().is_empty() {
        return invalid("netplan_command must not be empty".to_string());
    }
    if settings.validate_timeout_secs == 0 {
        return invalid("validate_timeout_secs must be greater than zero".to_string());
    }
    if settings.apply_timeout_secs == 0 {
        return invalid("apply_timeout_secs must be greater than zero".to_string());
    }

    for (name, addresses) in &settings.providers {
        if name.trim().is_empty() || name.eq_ignore_ascii_case(CUSTOM_PROVIDER) {
            return invalid(format!("'{}' cannot be used as a provider name", name));
        }
        if addresses.is_empty() {
            return invalid(format!("provider '{}' has no addresses", name));
        }
        for address in addresses {
            if let Err(e) = parse_address(address) {
                return invalid(format!("provider '{}': {}", name, e));
            }
        }
    }
    Ok(())
}
