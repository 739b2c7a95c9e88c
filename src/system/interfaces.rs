//! Network interface enumeration and target selection.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;
use serde::Serialize;

use crate::error::{NsplanError, Result};
use crate::netplan::InterfaceKind;
use crate::ui::{Prompt, PromptOption, UserInterface};

/// Name prefixes of virtual interfaces that never receive nameservers.
static VIRTUAL_INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:docker|br-|veth|virbr|lxcbr|lxdbr|cni|flannel|cali|vxlan|tun|tap|wg|tailscale|zt|ppp|vmnet|vboxnet|ipsec|vpn|utun|dummy)",
    )
    .unwrap()
});

const LOOPBACK: &str = "lo";

/// A network interface known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub kind: InterfaceKind,
}

impl InterfaceInfo {
    /// Interface whose kind is guessed from its name.
    pub fn from_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: InterfaceKind::from_name(name),
        }
    }
}

/// Source of the host's network interfaces.
pub trait InterfaceSource {
    /// All interfaces, including loopback and virtual ones.
    fn interfaces(&self) -> anyhow::Result<Vec<InterfaceInfo>>;

    /// Where interfaces are read from, for error messages.
    fn origin(&self) -> PathBuf;
}

/// Reads interfaces from a sysfs `class/net` directory.
#[derive(Debug, Clone)]
pub struct SysfsInterfaces {
    dir: PathBuf,
}

impl SysfsInterfaces {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn kind_of(&self, name: &str) -> InterfaceKind {
        let entry = self.dir.join(name);
        if entry.join("wireless").exists() || entry.join("phy80211").exists() {
            InterfaceKind::Wireless
        } else {
            InterfaceKind::from_name(name)
        }
    }
}

impl InterfaceSource for SysfsInterfaces {
    fn interfaces(&self) -> anyhow::Result<Vec<InterfaceInfo>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("reading {}", self.dir.display()))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry?;
            // Plain files such as `bonding_masters` live here too.
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let kind = self.kind_of(&name);
            found.push(InterfaceInfo { name, kind });
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn origin(&self) -> PathBuf {
        self.dir.clone()
    }
}

/// Whether `name` is loopback or matches a virtual interface pattern.
pub fn is_virtual(name: &str) -> bool {
    name == LOOPBACK || VIRTUAL_INTERFACE.is_match(name)
}

/// Interfaces that may receive nameservers, sorted by name.
pub fn physical_interfaces(source: &dyn InterfaceSource) -> Result<Vec<InterfaceInfo>> {
    let all = source.interfaces().map_err(NsplanError::Other)?;
    let physical: Vec<InterfaceInfo> = all.into_iter().filter(|i| !is_virtual(&i.name)).collect();
    tracing::debug!(
        "Physical interfaces: {:?}",
        physical.iter().map(|i| i.name.as_str()).collect::<Vec<_>>()
    );
    Ok(physical)
}

/// Pick the interface to configure.
///
/// An explicit name always wins, even when sysfs does not list it. Otherwise
/// a single physical interface is selected automatically and several are
/// offered in a select prompt when the UI is interactive.
pub fn detect_target_interface(
    source: &dyn InterfaceSource,
    explicit: Option<&str>,
    ui: &mut dyn UserInterface,
) -> Result<InterfaceInfo> {
    if let Some(name) = explicit {
        let known = source
            .interfaces()
            .ok()
            .and_then(|all| all.into_iter().find(|i| i.name == name));
        return Ok(known.unwrap_or_else(|| {
            tracing::debug!("Interface {} not present in {}", name, source.origin().display());
            InterfaceInfo::from_name(name)
        }));
    }

    let mut candidates = physical_interfaces(source)?;
    match candidates.len() {
        0 => Err(NsplanError::NoInterfaceFound {
            dir: source.origin(),
        }),
        1 => {
            let chosen = candidates.remove(0);
            tracing::info!("Using interface {} ({})", chosen.name, chosen.kind);
            Ok(chosen)
        }
        _ if ui.is_interactive() => {
            let options = candidates
                .iter()
                .map(|i| PromptOption::new(format!("{} ({})", i.name, i.kind), i.name.clone()))
                .collect();
            let answer = ui
                .prompt(&Prompt::select(
                    "interface",
                    "Which interface should use the new nameservers?",
                    options,
                ))?
                .as_string();
            candidates
                .into_iter()
                .find(|i| i.name == answer)
                .ok_or_else(|| NsplanError::Other(anyhow::anyhow!("unknown interface {}", answer)))
        }
        _ => Err(NsplanError::InterfaceSelectionRequired {
            candidates: candidates.into_iter().map(|i| i.name).collect(),
        }),
    }
}
