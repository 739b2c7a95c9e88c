//! Error types for nsplan operations.
//!
//! This module defines [`NsplanError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each failure category of the update pipeline has its own variant so the
//!   CLI can map it to a distinct exit code
//! - Collaborator failures (netplan, sysfs) arrive as `anyhow::Error` and are
//!   wrapped into the category they occurred in
//! - None of these errors are retried automatically

use std::path::PathBuf;
use thiserror::Error;

/// Outcome of the rollback attempted after a failed apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackStatus {
    /// The previous document was restored and re-applied.
    Restored,
    /// Restoring the previous document failed; the host is in an unknown state.
    Failed(String),
}

impl std::fmt::Display for RollbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restored => write!(f, "previous configuration restored"),
            Self::Failed(reason) => write!(f, "rollback failed: {}", reason),
        }
    }
}

/// Core error type for nsplan operations.
#[derive(Debug, Error)]
pub enum NsplanError {
    /// Several netplan documents exist and none was selected.
    #[error("Ambiguous configuration: {} documents found in {dir} ({}); select one with --file", .candidates.len(), .candidates.join(", "))]
    AmbiguousConfiguration { dir: PathBuf, candidates: Vec<String> },

    /// A nameserver address is not a valid dotted-quad IPv4 address.
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    /// Provider identifier is neither a preset nor `custom`.
    #[error("Unknown DNS provider: {name}")]
    UnknownProvider { name: String },

    /// No physical network interface is available.
    #[error("No network interface found in {dir}")]
    NoInterfaceFound { dir: PathBuf },

    /// Several interfaces qualify and none was selected.
    #[error("Several interfaces found ({}); select one with --interface", .candidates.join(", "))]
    InterfaceSelectionRequired { candidates: Vec<String> },

    /// Dry-run validation of the candidate document failed.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// Applying the committed document failed.
    #[error("Apply failed: {message} ({rollback})")]
    ApplyFailed {
        message: String,
        rollback: RollbackStatus,
    },

    /// Requested backup does not exist.
    #[error("Backup not found: {id}")]
    BackupNotFound { id: String },

    /// Backup content no longer matches its recorded digest.
    #[error("Backup {id} is corrupted: expected sha256 {expected}, found {actual}")]
    BackupCorrupted {
        id: String,
        expected: String,
        actual: String,
    },

    /// Failed to parse a netplan document.
    #[error("Failed to parse {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid nsplan settings.
    #[error("Invalid settings: {message}")]
    SettingsError { message: String },

    /// External command could not be run.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NsplanError {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::AmbiguousConfiguration { .. } => 3,
            Self::InvalidAddress { .. } | Self::UnknownProvider { .. } => 4,
            Self::NoInterfaceFound { .. } | Self::InterfaceSelectionRequired { .. } => 5,
            Self::ValidationFailed { .. } => 6,
            Self::ApplyFailed {
                rollback: RollbackStatus::Restored,
                ..
            } => 7,
            Self::ApplyFailed {
                rollback: RollbackStatus::Failed(_),
                ..
            } => 8,
            Self::BackupNotFound { .. } | Self::BackupCorrupted { .. } => 9,
            _ => 1,
        }
    }

    /// Short category name shown in failure messages.
    pub fn category(&self) -> &'static str {
        match self {
            Self::AmbiguousConfiguration { .. } => "AmbiguousConfiguration",
            Self::InvalidAddress { .. } => "InvalidAddress",
            Self::UnknownProvider { .. } => "UnknownProvider",
            Self::NoInterfaceFound { .. } => "NoInterfaceFound",
            Self::InterfaceSelectionRequired { .. } => "InterfaceSelectionRequired",
            Self::ValidationFailed { .. } => "ValidationFailed",
            Self::ApplyFailed { .. } => "ApplyFailed",
            Self::BackupNotFound { .. } => "BackupNotFound",
            Self::BackupCorrupted { .. } => "BackupCorrupted",
            Self::ConfigParseError { .. } => "ConfigParseError",
            Self::SettingsError { .. } => "SettingsError",
            Self::CommandFailed { .. } => "CommandFailed",
            Self::Io(_) => "Io",
            Self::Other(_) => "Other",
        }
    }
}

/// Result type alias for nsplan operations.
pub type Result<T> = std::result::Result<T, NsplanError>;
