//! Netplan documents: the schema-aware model and the locator.

pub mod document;
pub mod locate;

pub use document::{InterfaceEntry, InterfaceKind, NameserverChange, NetworkConfig, DEVICE_SECTIONS};
pub use locate::{find_documents, locate_configuration, LiveDocument, DEFAULT_DOCUMENT_NAME};
