//! nsplan - point a machine's netplan configuration at a DNS provider.
//!
//! nsplan locates the netplan document that configures the primary
//! network interface, rewrites its `nameservers` block to use a well-known
//! or custom DNS provider, validates the result with `netplan generate`
//! and applies it with `netplan apply`. Every change is preceded by a
//! checksummed backup, and a failed apply is rolled back automatically.
//!
//! # Modules
//!
//! - [`backup`] - Checksummed backups of netplan documents
//! - [`cli`] - Command-line interface and argument parsing
//! - [`context`] - Resolved runtime settings shared by commands
//! - [`dns`] - IPv4 address parsing and the DNS provider catalog
//! - [`error`] - Error types and result aliases
//! - [`netplan`] - Netplan document discovery, parsing and editing
//! - [`settings`] - Layered settings files and environment overrides
//! - [`system`] - Interfaces, external commands and atomic writes
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`updater`] - The validate, apply and roll back workflow
//!
//! # Example
//!
//! ```
//! use nsplan::dns::ProviderCatalog;
//! use nsplan::netplan::{InterfaceKind, NetworkConfig};
//!
//! let catalog = ProviderCatalog::builtin();
//! let cloudflare = catalog.resolve("cloudflare", &[]).unwrap();
//!
//! let mut config = NetworkConfig::new();
//! config.apply_nameservers("eth0", InterfaceKind::Wired, &cloudflare.addresses);
//! assert!(config.to_yaml().unwrap().contains("1.1.1.1"));
//! ```

pub mod backup;
pub mod cli;
pub mod context;
pub mod dns;
pub mod error;
pub mod netplan;
pub mod settings;
pub mod system;
pub mod ui;
pub mod updater;

pub use error::{NsplanError, Result};
