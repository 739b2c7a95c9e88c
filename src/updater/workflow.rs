//! The Backup → Validate → Commit pipeline.

use std::path::{Path, PathBuf};

use crate::backup::{BackupRecord, BackupStore};
use crate::dns::ResolvedProvider;
use crate::error::{NsplanError, Result, RollbackStatus};
use crate::netplan::{LiveDocument, NameserverChange};
use crate::system::{write_atomic, InterfaceInfo, NetworkStack, PRIVATE_MODE};
use crate::ui::UserInterface;

use super::phase::{PhaseTracker, UpdatePhase};

/// A computed but not yet committed nameserver change.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub path: PathBuf,
    /// Bytes currently on disk, `None` if the document does not exist.
    pub original: Option<Vec<u8>>,
    /// Serialized candidate document.
    pub candidate: Vec<u8>,
    pub change: NameserverChange,
    pub interface: InterfaceInfo,
    pub provider: ResolvedProvider,
}

impl UpdatePlan {
    /// Apply `provider` to `interface` in a copy of the live document.
    pub fn build(
        live: &LiveDocument,
        interface: &InterfaceInfo,
        provider: &ResolvedProvider,
    ) -> Result<Self> {
        let mut config = live.config.clone();
        let change = config.apply_nameservers(&interface.name, interface.kind, &provider.addresses);
        let candidate = config.to_yaml()?.into_bytes();

        Ok(Self {
            path: live.path.clone(),
            original: live.original.clone(),
            candidate,
            change,
            interface: interface.clone(),
            provider: provider.clone(),
        })
    }

    /// The candidate is byte-identical to what is already on disk.
    pub fn is_unchanged(&self) -> bool {
        self.original.as_deref() == Some(self.candidate.as_slice())
    }

    pub fn candidate_text(&self) -> String {
        String::from_utf8_lossy(&self.candidate).into_owned()
    }
}

/// Result of [`DnsUpdater::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing to do; no backup was taken.
    Unchanged,
    /// The candidate is live; `backup` holds the previous document.
    Committed { backup: BackupRecord },
}

/// Result of [`DnsUpdater::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// The backup that is now live.
    pub restored: BackupRecord,
    /// Backup of the document that was replaced.
    pub previous: BackupRecord,
}

/// Runs one update or restore against the live netplan configuration.
pub struct DnsUpdater<'a> {
    stack: &'a dyn NetworkStack,
    store: BackupStore,
    phase: PhaseTracker,
}

impl<'a> DnsUpdater<'a> {
    pub fn new(stack: &'a dyn NetworkStack, store: BackupStore) -> Self {
        Self {
            stack,
            store,
            phase: PhaseTracker::new(),
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase.current()
    }

    pub fn phase_history(&self) -> &[UpdatePhase] {
        self.phase.history()
    }

    /// Back up, validate and commit `plan`.
    ///
    /// The live document is only replaced after validation passes. If
    /// `netplan apply` then fails, the backup is written back and applied
    /// again before [`NsplanError::ApplyFailed`] is returned.
    pub fn apply(&mut self, plan: &UpdatePlan, ui: &mut dyn UserInterface) -> Result<UpdateOutcome> {
        if plan.is_unchanged() {
            tracing::info!(
                "{} already uses {} on {}",
                plan.path.display(),
                plan.provider.name,
                plan.interface.name
            );
            return Ok(UpdateOutcome::Unchanged);
        }

        let backup = self.store.create(&plan.path, plan.original.as_deref())?;
        self.phase.advance(UpdatePhase::Validating)?;

        self.validate(&plan.path, &plan.candidate, ui)?;
        self.commit(&plan.path, Some(&plan.candidate), &backup, ui)?;

        Ok(UpdateOutcome::Committed { backup })
    }

    /// Make a stored backup live again.
    ///
    /// `selector` is a backup id or `latest`. The current document is backed
    /// up first, so a restore can itself be undone.
    pub fn restore(&mut self, selector: &str, ui: &mut dyn UserInterface) -> Result<RestoreOutcome> {
        let restored = self.store.get(selector)?;
        let bytes = self.store.read_verified(&restored)?;
        let path = restored.source.clone();

        let current = read_optional(&path)?;
        let previous = self.store.create(&path, current.as_deref())?;
        self.phase.advance(UpdatePhase::Validating)?;

        if restored.existed {
            self.validate(&path, &bytes, ui)?;
            self.commit(&path, Some(&bytes), &previous, ui)?;
        } else {
            self.commit(&path, None, &previous, ui)?;
        }

        tracing::info!("Restored {} from backup {}", path.display(), restored.id);
        Ok(RestoreOutcome { restored, previous })
    }

    fn validate(&mut self, path: &Path, candidate: &[u8], ui: &mut dyn UserInterface) -> Result<()> {
        let mut spinner = ui.start_spinner("Validating with netplan generate");
        match self.stack.validate(path, candidate) {
            Ok(()) => {
                spinner.finish_success("Configuration is valid");
                Ok(())
            }
            Err(e) => {
                spinner.finish_error("Validation failed");
                self.phase.advance(UpdatePhase::RolledBack)?;
                tracing::warn!("Validation of {} failed: {:#}", path.display(), e);
                Err(NsplanError::ValidationFailed {
                    message: format!("{:#}", e),
                })
            }
        }
    }

    /// Replace the live document (or remove it for `None`) and apply.
    fn commit(
        &mut self,
        path: &Path,
        content: Option<&[u8]>,
        backup: &BackupRecord,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        if let Err(e) = install(path, content) {
            self.phase.advance(UpdatePhase::RolledBack)?;
            return Err(e);
        }
        tracing::debug!("Wrote {}", path.display());

        let mut spinner = ui.start_spinner("Applying with netplan apply");
        match self.stack.apply() {
            Ok(()) => {
                spinner.finish_success("Configuration applied");
                self.phase.advance(UpdatePhase::Committed)?;
                Ok(())
            }
            Err(e) => {
                spinner.finish_error("netplan apply failed");
                tracing::warn!("Apply failed, rolling back to backup {}: {:#}", backup.id, e);

                let rollback = match self.roll_back(path, backup) {
                    Ok(()) => RollbackStatus::Restored,
                    Err(reason) => {
                        tracing::error!("Rollback of {} failed: {}", path.display(), reason);
                        RollbackStatus::Failed(reason)
                    }
                };
                self.phase.advance(UpdatePhase::RolledBack)?;

                Err(NsplanError::ApplyFailed {
                    message: format!("{:#}", e),
                    rollback,
                })
            }
        }
    }

    fn roll_back(&self, path: &Path, backup: &BackupRecord) -> std::result::Result<(), String> {
        let bytes = self
            .store
            .read_verified(backup)
            .map_err(|e| e.to_string())?;
        let content = backup.existed.then_some(bytes.as_slice());

        install(path, content).map_err(|e| e.to_string())?;
        self.stack
            .apply()
            .map_err(|e| format!("re-applying previous configuration: {:#}", e))
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn install(path: &Path, content: Option<&[u8]>) -> Result<()> {
    match content {
        Some(bytes) => write_atomic(path, bytes, PRIVATE_MODE),
        None => match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        },
    }
}
