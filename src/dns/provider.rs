//! DNS provider presets.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::Serialize;

use crate::error::{NsplanError, Result};

use super::address::{dedup_addresses, parse_address_list};

/// Identifier that selects a user-supplied address list.
pub const CUSTOM_PROVIDER: &str = "custom";

/// Built-in public DNS resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsProvider {
    Cloudflare,
    Google,
    Quad9,
    OpenDns,
    AdGuard,
    NextDns,
}

impl DnsProvider {
    /// Every built-in preset, in menu order.
    pub const ALL: [DnsProvider; 6] = [
        DnsProvider::Cloudflare,
        DnsProvider::Google,
        DnsProvider::Quad9,
        DnsProvider::OpenDns,
        DnsProvider::AdGuard,
        DnsProvider::NextDns,
    ];

    /// Identifier accepted on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Cloudflare => "cloudflare",
            Self::Google => "google",
            Self::Quad9 => "quad9",
            Self::OpenDns => "opendns",
            Self::AdGuard => "adguard",
            Self::NextDns => "nextdns",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cloudflare => "Cloudflare",
            Self::Google => "Google",
            Self::Quad9 => "Quad9",
            Self::OpenDns => "OpenDNS",
            Self::AdGuard => "AdGuard",
            Self::NextDns => "NextDNS",
        }
    }

    /// Primary and secondary resolver addresses.
    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        match self {
            Self::Cloudflare => vec![Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 0, 0, 1)],
            Self::Google => vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)],
            Self::Quad9 => vec![
                Ipv4Addr::new(9, 9, 9, 9),
                Ipv4Addr::new(149, 112, 112, 112),
            ],
            Self::OpenDns => vec![
                Ipv4Addr::new(208, 67, 222, 222),
                Ipv4Addr::new(208, 67, 220, 220),
            ],
            Self::AdGuard => vec![
                Ipv4Addr::new(94, 140, 14, 14),
                Ipv4Addr::new(94, 140, 15, 15),
            ],
            Self::NextDns => vec![Ipv4Addr::new(45, 90, 28, 0), Ipv4Addr::new(45, 90, 30, 0)],
        }
    }

    /// Look up a preset by identifier, ignoring case and separators.
    pub fn from_id(id: &str) -> Option<Self> {
        let normalized: String = id
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        Self::ALL.into_iter().find(|p| p.id() == normalized)
    }
}

impl std::fmt::Display for DnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A provider resolved to its final nameserver list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProvider {
    /// Name shown to the user.
    pub name: String,
    /// Ordered, deduplicated, non-empty address list.
    pub addresses: Vec<Ipv4Addr>,
}

/// Listing entry for the `providers` command and the interactive menu.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderEntry {
    pub id: String,
    pub label: String,
    pub addresses: Vec<String>,
}

/// Built-in presets plus named presets from the settings file.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    presets: BTreeMap<String, Vec<String>>,
}

impl ProviderCatalog {
    /// Catalog with only the built-in presets.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Catalog with additional named presets.
    ///
    /// Preset names are matched case-insensitively. A preset that shares a
    /// name with a built-in is shadowed by the built-in.
    pub fn with_presets(presets: BTreeMap<String, Vec<String>>) -> Self {
        let presets = presets
            .into_iter()
            .map(|(name, addrs)| (name.to_lowercase(), addrs))
            .collect();
        Self { presets }
    }

    /// Resolve a provider identifier to its nameserver list.
    ///
    /// `custom` takes its addresses from `custom_addresses`; every other
    /// identifier ignores them.
    pub fn resolve(&self, id: &str, custom_addresses: &[String]) -> Result<ResolvedProvider> {
        let id = id.trim();

        if id.eq_ignore_ascii_case(CUSTOM_PROVIDER) {
            return Ok(ResolvedProvider {
                name: "Custom".to_string(),
                addresses: resolve_list(custom_addresses)?,
            });
        }

        if let Some(preset) = DnsProvider::from_id(id) {
            return Ok(ResolvedProvider {
                name: preset.display_name().to_string(),
                addresses: dedup_addresses(preset.addresses()),
            });
        }

        if let Some(addrs) = self.presets.get(&id.to_lowercase()) {
            return Ok(ResolvedProvider {
                name: id.to_string(),
                addresses: resolve_list(addrs)?,
            });
        }

        Err(NsplanError::UnknownProvider {
            name: id.to_string(),
        })
    }

    /// All selectable providers except `custom`.
    pub fn entries(&self) -> Vec<ProviderEntry> {
        let mut entries: Vec<ProviderEntry> = DnsProvider::ALL
            .iter()
            .map(|p| ProviderEntry {
                id: p.id().to_string(),
                label: p.display_name().to_string(),
                addresses: p.addresses().iter().map(|a| a.to_string()).collect(),
            })
            .collect();

        for (name, addrs) in &self.presets {
            if DnsProvider::from_id(name).is_some() {
                continue;
            }
            entries.push(ProviderEntry {
                id: name.clone(),
                label: name.clone(),
                addresses: addrs.clone(),
            });
        }

        entries
    }
}

fn resolve_list(raw: &[String]) -> Result<Vec<Ipv4Addr>> {
    let mut addresses = Vec::new();
    for entry in raw {
        addresses.extend(parse_address_list(entry)?);
    }
    let addresses = dedup_addresses(addresses);
    if addresses.is_empty() {
        return Err(NsplanError::InvalidAddress {
            input: raw.join(","),
            reason: "at least one nameserver address is required".to_string(),
        });
    }
    Ok(addresses)
}
