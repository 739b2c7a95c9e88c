//! End-to-end tests for the nsplan binary.
//!
//! Each test gets a scratch host: a netplan directory, a backup directory,
//! a fake `/sys/class/net` and a stand-in for the netplan command.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DOC: &str = "# managed by hand\nnetwork:\n  version: 2\n  renderer: networkd\n  ethernets:\n    eth0:\n      dhcp4: true\n";

/// Succeeds for `generate`, fails the first `apply` and succeeds after.
const FLAKY_APPLY: &str = r#"#!/bin/sh
marker="$(dirname "$0")/applied-once"
if [ "$1" = "apply" ] && [ ! -e "$marker" ]; then
    touch "$marker"
    echo "apply blew up" >&2
    exit 1
fi
exit 0
"#;

struct Host {
    temp: TempDir,
}

impl Host {
    fn new(interfaces: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("netplan")).unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        for name in interfaces.iter().chain(["lo"].iter()) {
            fs::create_dir_all(temp.path().join("sys").join(name)).unwrap();
        }
        Self { temp }
    }

    fn netplan_dir(&self) -> PathBuf {
        self.temp.path().join("netplan")
    }

    fn backup_dir(&self) -> PathBuf {
        self.temp.path().join("backups")
    }

    fn write_document(&self, name: &str, content: &str) -> PathBuf {
        let path = self.netplan_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn write_script(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn nsplan(&self, netplan_command: &str) -> Command {
        let mut cmd = Command::new(cargo_bin("nsplan"));
        cmd.env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("HOME", self.temp.path())
            .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env("NSPLAN_NETPLAN_DIR", self.netplan_dir())
            .env("NSPLAN_BACKUP_DIR", self.backup_dir())
            .env("NSPLAN_SYSFS_NET_DIR", self.temp.path().join("sys"))
            .env("NSPLAN_NETPLAN_COMMAND", netplan_command)
            .arg("--non-interactive");
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("nsplan"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("netplan"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("nsplan"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn set_provider_rewrites_document_and_backs_up() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["set", "cloudflare"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eth0 now uses Cloudflare"));

    let text = read(&doc);
    assert!(text.contains("1.1.1.1"));
    assert!(text.contains("use-dns: false"));

    let backups: Vec<_> = fs::read_dir(host.backup_dir())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".yaml"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(read(&host.backup_dir().join(&backups[0])), DOC);
    Ok(())
}

#[test]
fn set_twice_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true").args(["set", "quad9"]).assert().success();
    host.nsplan("true")
        .args(["set", "quad9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
    Ok(())
}

#[test]
fn set_custom_addresses() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["set", "--address", "10.0.0.53,10.0.0.54,10.0.0.53"])
        .assert()
        .success();

    let text = read(&doc);
    assert_eq!(text.matches("10.0.0.53").count(), 1);
    assert!(text.contains("10.0.0.54"));
    Ok(())
}

#[test]
fn dry_run_leaves_document_alone() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("false")
        .args(["set", "google", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8.8.8.8"));

    assert_eq!(read(&doc), DOC);
    assert!(!host.backup_dir().exists());
    Ok(())
}

#[test]
fn missing_document_is_created() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);

    host.nsplan("true")
        .args(["set", "google"])
        .assert()
        .success();

    let text = read(&host.netplan_dir().join("01-netcfg.yaml"));
    assert!(text.contains("eth0"));
    assert!(text.contains("8.8.4.4"));
    Ok(())
}

#[test]
fn invalid_address_exits_4() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["set", "custom", "--address", "1.2.3.256"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("InvalidAddress"));

    assert_eq!(read(&doc), DOC);
    Ok(())
}

#[test]
fn unknown_provider_exits_4() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["set", "nosuchdns"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("UnknownProvider"));
    Ok(())
}

#[test]
fn several_documents_exit_3() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-a.yaml", DOC);
    host.write_document("02-b.yaml", DOC);

    host.nsplan("true")
        .args(["set", "cloudflare"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("AmbiguousConfiguration"));

    host.nsplan("true")
        .args(["--file", "02-b.yaml", "set", "cloudflare"])
        .assert()
        .success();
    assert!(read(&host.netplan_dir().join("02-b.yaml")).contains("1.1.1.1"));
    assert_eq!(read(&host.netplan_dir().join("01-a.yaml")), DOC);
    Ok(())
}

#[test]
fn no_physical_interface_exits_5() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["docker0", "veth12ab"]);
    host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["set", "cloudflare"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("NoInterfaceFound"));
    Ok(())
}

#[test]
fn several_interfaces_need_a_choice() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0", "eth1"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["set", "cloudflare"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("InterfaceSelectionRequired"));

    host.nsplan("true")
        .args(["set", "cloudflare", "--interface", "eth1"])
        .assert()
        .success();
    assert!(read(&doc).contains("eth1"));
    Ok(())
}

#[test]
fn validation_failure_exits_6_and_keeps_document() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("false")
        .args(["set", "cloudflare"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("ValidationFailed"));

    assert_eq!(read(&doc), DOC);
    Ok(())
}

#[cfg(unix)]
#[test]
fn failed_apply_rolls_back_and_exits_7() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);
    let script = host.write_script("fake-netplan.sh", FLAKY_APPLY);

    host.nsplan(&format!("sh {}", script.display()))
        .args(["set", "cloudflare"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("ApplyFailed"))
        .stderr(predicate::str::contains("restored"));

    assert_eq!(read(&doc), DOC);
    Ok(())
}

#[test]
fn restore_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true").args(["set", "adguard"]).assert().success();
    assert_ne!(read(&doc), DOC);

    host.nsplan("true")
        .args(["restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));
    assert_eq!(read(&doc), DOC);

    // The restore saved the adguard document, so it can be undone too.
    host.nsplan("true").arg("restore").assert().success();
    assert!(read(&doc).contains("94.140.14.14"));
    Ok(())
}

#[test]
fn unknown_backup_exits_9() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .args(["restore", "20200101T000000000Z"])
        .assert()
        .code(9)
        .stderr(predicate::str::contains("BackupNotFound"));
    Ok(())
}

#[test]
fn show_json_reports_interfaces() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-netcfg.yaml", DOC);
    host.nsplan("true").args(["set", "opendns"]).assert().success();

    let output = host.nsplan("true").args(["show", "--json"]).output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["interfaces"][0]["name"], "eth0");
    assert_eq!(value["interfaces"][0]["nameservers"][0], "208.67.222.222");
    assert!(value["latest_backup"].is_string());
    Ok(())
}

#[test]
fn no_subcommand_without_terminal_shows_configuration() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .assert()
        .success()
        .stdout(predicate::str::contains("INTERFACE"))
        .stdout(predicate::str::contains("eth0"));
    Ok(())
}

#[test]
fn backups_lists_each_change() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    host.write_document("01-netcfg.yaml", DOC);

    host.nsplan("true")
        .arg("backups")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups in"));

    host.nsplan("true").args(["set", "google"]).assert().success();
    host.nsplan("true").args(["set", "quad9"]).assert().success();

    let output = host.nsplan("true").args(["backups", "--json"]).output()?;
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn providers_lists_catalog_and_presets() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let settings = host.temp.path().join("nsplan.yml");
    fs::write(&settings, "providers:\n  office: [10.0.0.53]\n")?;

    host.nsplan("true")
        .arg("--config")
        .arg(&settings)
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("cloudflare"))
        .stdout(predicate::str::contains("9.9.9.9"))
        .stdout(predicate::str::contains("office"));
    Ok(())
}

#[test]
fn preset_provider_from_settings() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let doc = host.write_document("01-netcfg.yaml", DOC);
    let settings = host.temp.path().join("nsplan.yml");
    fs::write(&settings, "providers:\n  office: [10.0.0.53, 10.0.0.54]\n")?;

    host.nsplan("true")
        .arg("--config")
        .arg(&settings)
        .args(["set", "office"])
        .assert()
        .success();
    assert!(read(&doc).contains("10.0.0.54"));
    Ok(())
}

#[test]
fn broken_settings_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::new(&["eth0"]);
    let settings = host.temp.path().join("nsplan.yml");
    fs::write(&settings, "no_such_setting: 1\n")?;

    host.nsplan("true")
        .arg("--config")
        .arg(&settings)
        .arg("providers")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ConfigParseError"));
    Ok(())
}

#[test]
fn completions_generate_script() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("nsplan"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nsplan"));
    Ok(())
}
