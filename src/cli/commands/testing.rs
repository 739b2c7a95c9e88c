//! Shared fixtures for command tests.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::context::{Context, ContextOverrides};
use crate::settings::Settings;

/// A temporary host: netplan dir, backup dir and a fake sysfs.
pub struct TestHost {
    pub temp: TempDir,
}

impl TestHost {
    /// Host whose sysfs lists `interfaces` (plus loopback).
    pub fn new(interfaces: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("netplan")).unwrap();
        for name in interfaces.iter().chain(std::iter::once(&"lo")) {
            std::fs::create_dir_all(temp.path().join("sys").join(name)).unwrap();
        }
        Self { temp }
    }

    pub fn netplan_dir(&self) -> PathBuf {
        self.temp.path().join("netplan")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.temp.path().join("backups")
    }

    pub fn write_document(&self, name: &str, text: &str) -> PathBuf {
        let path = self.netplan_dir().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    /// Context whose netplan command is `netplan_command` (`true`/`false`).
    pub fn context(&self, netplan_command: &str) -> Context {
        let settings = Settings {
            netplan_dir: self.netplan_dir(),
            backup_dir: self.backup_dir(),
            sysfs_net_dir: self.temp.path().join("sys"),
            netplan_command: netplan_command.to_string(),
            validate_timeout_secs: 10,
            apply_timeout_secs: 10,
            ..Default::default()
        };
        Context::new(&settings, ContextOverrides::default(), false, true)
    }
}
