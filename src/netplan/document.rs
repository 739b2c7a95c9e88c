//! Netplan document model.
//!
//! The document is held as a YAML value tree so keys nsplan does not know
//! about survive an edit untouched and in their original order. Typed access
//! goes through [`InterfaceEntry`], a read-only view of one device.

use std::net::Ipv4Addr;
use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{NsplanError, Result};

/// Device sections that may hold interface entries, in lookup order.
pub const DEVICE_SECTIONS: [&str; 8] = [
    "ethernets",
    "wifis",
    "bonds",
    "bridges",
    "vlans",
    "tunnels",
    "modems",
    "vrfs",
];

/// Kind of physical interface, which decides the section new entries go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Wired,
    Wireless,
}

impl InterfaceKind {
    /// Netplan section for this kind of interface.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Wired => "ethernets",
            Self::Wireless => "wifis",
        }
    }

    /// Guess the kind from an interface name alone.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("wl") || name.starts_with("ath") {
            Self::Wireless
        } else {
            Self::Wired
        }
    }
}

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wired => write!(f, "wired"),
            Self::Wireless => write!(f, "wireless"),
        }
    }
}

/// Read-only view of one interface entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceEntry {
    /// Interface name (the key under its section).
    pub name: String,
    /// Section the entry lives in (`ethernets`, `wifis`, ...).
    pub section: String,
    pub dhcp4: bool,
    pub dhcp6: bool,
    /// Static nameserver addresses, in document order.
    pub nameservers: Vec<String>,
    /// DNS search domains.
    pub search: Vec<String>,
    /// Whether every enabled DHCP family ignores DHCP-provided DNS.
    pub suppress_dhcp_dns: bool,
}

impl InterfaceEntry {
    fn from_value(name: &str, section: &str, value: &Value) -> Self {
        let dhcp4 = truthy(value.get("dhcp4"));
        let dhcp6 = truthy(value.get("dhcp6"));
        let ignores_dns = |family: &str| {
            value
                .get(family)
                .and_then(|o| o.get("use-dns"))
                .is_some_and(|v| !truthy(Some(v)))
        };
        let suppress_dhcp_dns = (dhcp4 || dhcp6)
            && (!dhcp4 || ignores_dns("dhcp4-overrides"))
            && (!dhcp6 || ignores_dns("dhcp6-overrides"));

        let nameservers = value.get("nameservers");
        Self {
            name: name.to_string(),
            section: section.to_string(),
            dhcp4,
            dhcp6,
            nameservers: string_list(nameservers.and_then(|n| n.get("addresses"))),
            search: string_list(nameservers.and_then(|n| n.get("search"))),
            suppress_dhcp_dns,
        }
    }
}

/// What [`NetworkConfig::apply_nameservers`] did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameserverChange {
    /// An existing entry had its nameservers replaced.
    Updated { section: String },
    /// A new DHCP entry was created.
    Created { section: String },
}

/// A parsed netplan document.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    root: Mapping,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkConfig {
    /// Netplan schema version written into new documents.
    pub const VERSION: u64 = 2;

    /// Synthesize an empty document: version 2, networkd, no interfaces.
    pub fn new() -> Self {
        let mut network = Mapping::new();
        network.insert(key("version"), Value::from(Self::VERSION));
        network.insert(key("renderer"), Value::from("networkd"));
        network.insert(key("ethernets"), Value::Mapping(Mapping::new()));

        let mut root = Mapping::new();
        root.insert(key("network"), Value::Mapping(network));
        Self { root }
    }

    /// Parse document text. A blank document parses as a new document.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let parse_error = |message: String| NsplanError::ConfigParseError {
            path: path.to_path_buf(),
            message,
        };

        let blank = text
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#') || line == "---");
        if blank {
            return Ok(Self::new());
        }

        let value: Value = serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(root) => {
                match root.get("network") {
                    Some(Value::Mapping(_)) => {}
                    Some(_) => {
                        return Err(parse_error("'network' must be a mapping".to_string()))
                    }
                    None => {
                        return Err(parse_error(
                            "missing top-level 'network' key".to_string(),
                        ))
                    }
                }
                Ok(Self { root })
            }
            _ => Err(parse_error("document root must be a mapping".to_string())),
        }
    }

    /// Serialize back to YAML text.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(|e| NsplanError::Other(e.into()))
    }

    /// The underlying value tree.
    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    fn network(&self) -> Option<&Value> {
        self.root.get("network")
    }

    /// Declared schema version.
    pub fn version(&self) -> Option<u64> {
        self.network()?.get("version")?.as_u64()
    }

    /// Declared renderer (`networkd`, `NetworkManager`).
    pub fn renderer(&self) -> Option<&str> {
        self.network()?.get("renderer")?.as_str()
    }

    /// All interface entries across every device section.
    pub fn interfaces(&self) -> Vec<InterfaceEntry> {
        let mut entries = Vec::new();
        let Some(network) = self.network() else {
            return entries;
        };

        for section in DEVICE_SECTIONS {
            if let Some(Value::Mapping(devices)) = network.get(section) {
                for (name, value) in devices {
                    if let Some(name) = name.as_str() {
                        entries.push(InterfaceEntry::from_value(name, section, value));
                    }
                }
            }
        }
        entries
    }

    /// Look up one interface entry by name.
    pub fn interface(&self, name: &str) -> Option<InterfaceEntry> {
        self.interfaces().into_iter().find(|e| e.name == name)
    }

    /// Point an interface at the given nameservers.
    ///
    /// An existing entry keeps every field except `nameservers.addresses`
    /// and the `use-dns` override of each DHCP family it enables. A missing
    /// entry is created under the section for `kind` with DHCPv4 on.
    pub fn apply_nameservers(
        &mut self,
        name: &str,
        kind: InterfaceKind,
        addresses: &[Ipv4Addr],
    ) -> NameserverChange {
        let address_list = Value::Sequence(
            addresses
                .iter()
                .map(|a| Value::String(a.to_string()))
                .collect(),
        );

        let existing_section = self.interface(name).map(|e| e.section);
        let network = child_mapping(&mut self.root, "network");

        match existing_section {
            Some(section) => {
                let entry = child_mapping(child_mapping(network, &section), name);
                let dhcp4 = truthy(entry.get("dhcp4"));
                let dhcp6 = truthy(entry.get("dhcp6"));

                child_mapping(entry, "nameservers").insert(key("addresses"), address_list);
                if dhcp4 {
                    child_mapping(entry, "dhcp4-overrides")
                        .insert(key("use-dns"), Value::Bool(false));
                }
                if dhcp6 {
                    child_mapping(entry, "dhcp6-overrides")
                        .insert(key("use-dns"), Value::Bool(false));
                }

                NameserverChange::Updated { section }
            }
            None => {
                let section = kind.section();

                let mut overrides = Mapping::new();
                overrides.insert(key("use-dns"), Value::Bool(false));
                let mut nameservers = Mapping::new();
                nameservers.insert(key("addresses"), address_list);

                let mut entry = Mapping::new();
                entry.insert(key("dhcp4"), Value::Bool(true));
                entry.insert(key("dhcp4-overrides"), Value::Mapping(overrides));
                entry.insert(key("nameservers"), Value::Mapping(nameservers));

                child_mapping(network, section).insert(key(name), Value::Mapping(entry));

                NameserverChange::Created {
                    section: section.to_string(),
                }
            }
        }
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Get a nested mapping, replacing a missing or non-mapping value with an
/// empty mapping.
fn child_mapping<'a>(parent: &'a mut Mapping, name: &str) -> &'a mut Mapping {
    let slot = parent.entry(key(name)).or_insert(Value::Null);
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(map) => map,
        _ => unreachable!("slot was just set to a mapping"),
    }
}

/// Netplan accepts YAML 1.1 style booleans.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "true" | "yes" | "on" | "y"),
        _ => false,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUDFLARE: [Ipv4Addr; 2] = [Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 0, 0, 1)];

    const DHCP_DOC: &str = r#"
network:
  version: 2
  renderer: networkd
  ethernets:
    eth0:
      dhcp4: true
      optional: true
      match:
        macaddress: "52:54:00:12:34:56"
      set-name: eth0
    eth1:
      addresses:
        - 10.0.0.5/24
      routes:
        - to: default
          via: 10.0.0.1
"#;

    fn parse(text: &str) -> NetworkConfig {
        NetworkConfig::parse(text, Path::new("/etc/netplan/test.yaml")).unwrap()
    }

    fn eth(doc: &NetworkConfig, name: &str) -> Value {
        doc.as_mapping()["network"]["ethernets"][name].clone()
    }

    #[test]
    fn new_document_has_version_2_and_no_interfaces() {
        let doc = NetworkConfig::new();
        assert_eq!(doc.version(), Some(2));
        assert_eq!(doc.renderer(), Some("networkd"));
        assert!(doc.interfaces().is_empty());
        assert!(doc.as_mapping()["network"]["ethernets"].is_mapping());
    }

    #[test]
    fn blank_text_parses_as_new_document() {
        assert_eq!(parse(""), NetworkConfig::new());
        assert_eq!(parse("# only a comment\n"), NetworkConfig::new());
    }

    #[test]
    fn rejects_document_without_network_key() {
        let err = NetworkConfig::parse("foo: bar\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, NsplanError::ConfigParseError { .. }));
        assert!(err.to_string().contains("network"));
    }

    #[test]
    fn rejects_non_mapping_root() {
        assert!(NetworkConfig::parse("- a\n- b\n", Path::new("x.yaml")).is_err());
        assert!(NetworkConfig::parse("network: 5\n", Path::new("x.yaml")).is_err());
    }

    #[test]
    fn rejects_invalid_yaml() {
        let err = NetworkConfig::parse("network: [unclosed\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, NsplanError::ConfigParseError { .. }));
    }

    #[test]
    fn reads_interface_entries() {
        let doc = parse(
            r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: yes
      dhcp4-overrides:
        use-dns: false
      nameservers:
        addresses: [9.9.9.9]
        search: [lan]
  wifis:
    wlan0:
      dhcp6: true
"#,
        );

        let eth0 = doc.interface("eth0").unwrap();
        assert_eq!(eth0.section, "ethernets");
        assert!(eth0.dhcp4);
        assert!(!eth0.dhcp6);
        assert_eq!(eth0.nameservers, vec!["9.9.9.9"]);
        assert_eq!(eth0.search, vec!["lan"]);
        assert!(eth0.suppress_dhcp_dns);

        let wlan0 = doc.interface("wlan0").unwrap();
        assert_eq!(wlan0.section, "wifis");
        assert!(wlan0.dhcp6);
        assert!(!wlan0.suppress_dhcp_dns);

        assert!(doc.interface("eth9").is_none());
    }

    #[test]
    fn cloudflare_on_dhcp_interface_sets_nameservers_and_suppresses_dhcp_dns() {
        let original = parse(DHCP_DOC);
        let mut doc = original.clone();

        let change = doc.apply_nameservers("eth0", InterfaceKind::Wired, &CLOUDFLARE);
        assert_eq!(
            change,
            NameserverChange::Updated {
                section: "ethernets".to_string()
            }
        );

        let eth0 = doc.interface("eth0").unwrap();
        assert_eq!(eth0.nameservers, vec!["1.1.1.1", "1.0.0.1"]);
        assert!(eth0.suppress_dhcp_dns);

        // Every other field is unchanged.
        assert_eq!(eth(&doc, "eth1"), eth(&original, "eth1"));
        let before = eth(&original, "eth0");
        let after = eth(&doc, "eth0");
        for field in ["dhcp4", "optional", "match", "set-name"] {
            assert_eq!(after[field], before[field], "{}", field);
        }
        assert_eq!(doc.version(), Some(2));
        assert_eq!(doc.renderer(), Some("networkd"));
    }

    #[test]
    fn updated_entry_keeps_field_order() {
        let mut doc = parse(DHCP_DOC);
        doc.apply_nameservers("eth0", InterfaceKind::Wired, &CLOUDFLARE);

        let keys: Vec<String> = eth(&doc, "eth0")
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str().map(String::from))
            .collect();
        assert_eq!(
            keys,
            vec![
                "dhcp4",
                "optional",
                "match",
                "set-name",
                "nameservers",
                "dhcp4-overrides"
            ]
        );
    }

    #[test]
    fn static_interface_is_not_given_dhcp_overrides() {
        let mut doc = parse(DHCP_DOC);
        doc.apply_nameservers("eth1", InterfaceKind::Wired, &CLOUDFLARE);

        let eth1 = eth(&doc, "eth1");
        assert!(eth1.get("dhcp4-overrides").is_none());
        assert!(eth1.get("dhcp6-overrides").is_none());
        assert_eq!(
            doc.interface("eth1").unwrap().nameservers,
            vec!["1.1.1.1", "1.0.0.1"]
        );
    }

    #[test]
    fn replaces_existing_nameservers_and_keeps_search() {
        let mut doc = parse(
            r#"
network:
  version: 2
  ethernets:
    enp3s0:
      dhcp4: true
      dhcp6: true
      nameservers:
        search: [example.com]
        addresses: [8.8.8.8, 8.8.8.8, 8.8.4.4]
"#,
        );

        doc.apply_nameservers("enp3s0", InterfaceKind::Wired, &CLOUDFLARE);

        let entry = doc.interface("enp3s0").unwrap();
        assert_eq!(entry.nameservers, vec!["1.1.1.1", "1.0.0.1"]);
        assert_eq!(entry.search, vec!["example.com"]);
        assert!(entry.suppress_dhcp_dns);
    }

    #[test]
    fn missing_wired_interface_is_created_under_ethernets() {
        let mut doc = NetworkConfig::new();
        let change = doc.apply_nameservers("eth0", InterfaceKind::Wired, &CLOUDFLARE);

        assert_eq!(
            change,
            NameserverChange::Created {
                section: "ethernets".to_string()
            }
        );
        let entry = doc.interface("eth0").unwrap();
        assert!(entry.dhcp4);
        assert!(entry.suppress_dhcp_dns);
        assert_eq!(entry.nameservers, vec!["1.1.1.1", "1.0.0.1"]);
    }

    #[test]
    fn missing_wireless_interface_is_created_under_wifis() {
        let mut doc = NetworkConfig::new();
        doc.apply_nameservers("wlp2s0", InterfaceKind::Wireless, &CLOUDFLARE);

        assert_eq!(doc.interface("wlp2s0").unwrap().section, "wifis");
    }

    #[test]
    fn existing_entry_in_other_section_is_updated_in_place() {
        let mut doc = parse(
            r#"
network:
  version: 2
  bridges:
    br0:
      dhcp4: true
      interfaces: [eth0]
"#,
        );

        let change = doc.apply_nameservers("br0", InterfaceKind::Wired, &CLOUDFLARE);
        assert_eq!(
            change,
            NameserverChange::Updated {
                section: "bridges".to_string()
            }
        );
        assert!(doc.as_mapping()["network"].get("ethernets").is_none());
    }

    #[test]
    fn reapplying_same_provider_is_byte_identical() {
        let mut first = parse(DHCP_DOC);
        first.apply_nameservers("eth0", InterfaceKind::Wired, &CLOUDFLARE);
        let first_text = first.to_yaml().unwrap();

        let mut second = parse(&first_text);
        second.apply_nameservers("eth0", InterfaceKind::Wired, &CLOUDFLARE);
        let second_text = second.to_yaml().unwrap();

        assert_eq!(first_text, second_text);
    }

    #[test]
    fn serialized_document_parses_back_to_same_tree() {
        let mut doc = parse(DHCP_DOC);
        doc.apply_nameservers("eth0", InterfaceKind::Wired, &CLOUDFLARE);

        let reparsed = parse(&doc.to_yaml().unwrap());
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn interface_kind_from_name() {
        assert_eq!(InterfaceKind::from_name("wlp2s0"), InterfaceKind::Wireless);
        assert_eq!(InterfaceKind::from_name("wlan0"), InterfaceKind::Wireless);
        assert_eq!(InterfaceKind::from_name("eth0"), InterfaceKind::Wired);
        assert_eq!(InterfaceKind::from_name("enp3s0"), InterfaceKind::Wired);
    }
}
