//! Timestamped backups of netplan documents.
//!
//! Every mutation of the live document is preceded by a backup. Each backup
//! is a verbatim copy named after its [`BackupId`], described in `index.yml`
//! together with its SHA-256 digest so a restore can prove it reproduces the
//! original bytes.

pub mod id;
pub mod store;

pub use id::BackupId;
pub use store::{sha256_hex, BackupRecord, BackupStore, LATEST};
