//! DNS provider presets and nameserver address validation.
//!
//! - [`address`] - strict dotted-quad parsing and deduplication
//! - [`provider`] - built-in presets, settings presets, and custom lists

pub mod address;
pub mod provider;

pub use address::{dedup_addresses, parse_address, parse_address_list};
pub use provider::{DnsProvider, ProviderCatalog, ResolvedProvider};
