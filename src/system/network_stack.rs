//! Adapter for the `netplan` command line tool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context as _};

use super::command::{run_with_timeout, split_command, CommandResult};
use crate::netplan::find_documents;

/// Validates and applies netplan documents on the host.
pub trait NetworkStack {
    /// Check that `candidate`, installed as `document`, would be accepted.
    ///
    /// Must not touch the live configuration.
    fn validate(&self, document: &Path, candidate: &[u8]) -> anyhow::Result<()>;

    /// Apply the live configuration.
    fn apply(&self) -> anyhow::Result<()>;
}

/// [`NetworkStack`] backed by `netplan generate` and `netplan apply`.
#[derive(Debug, Clone)]
pub struct NetplanStack {
    command: String,
    netplan_dir: PathBuf,
    scratch_parent: PathBuf,
    validate_timeout: Duration,
    apply_timeout: Duration,
}

impl NetplanStack {
    /// `scratch_parent` hosts the temporary root used for validation.
    pub fn new(
        command: impl Into<String>,
        netplan_dir: impl Into<PathBuf>,
        scratch_parent: impl Into<PathBuf>,
        validate_timeout: Duration,
        apply_timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            netplan_dir: netplan_dir.into(),
            scratch_parent: scratch_parent.into(),
            validate_timeout,
            apply_timeout,
        }
    }

    fn run(&self, args: &[&str], timeout: Duration) -> anyhow::Result<CommandResult> {
        let (program, mut full_args) = split_command(&self.command)
            .ok_or_else(|| anyhow!("netplan command is empty"))?;
        full_args.extend(args.iter().map(|a| a.to_string()));
        Ok(run_with_timeout(&program, &full_args, None, timeout)?)
    }

    /// Lay out `<scratch>/etc/netplan` with the other live documents plus
    /// the candidate under its final file name.
    fn stage(&self, scratch: &Path, document: &Path, candidate: &[u8]) -> anyhow::Result<()> {
        let staged_dir = scratch.join("etc").join("netplan");
        std::fs::create_dir_all(&staged_dir)
            .with_context(|| format!("creating {}", staged_dir.display()))?;

        let file_name = document
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", document.display()))?;

        for other in find_documents(&self.netplan_dir)? {
            if other.file_name() == Some(file_name) {
                continue;
            }
            if let Some(name) = other.file_name() {
                std::fs::copy(&other, staged_dir.join(name))
                    .with_context(|| format!("staging {}", other.display()))?;
            }
        }

        std::fs::write(staged_dir.join(file_name), candidate)
            .context("staging candidate document")?;
        Ok(())
    }
}

impl NetworkStack for NetplanStack {
    fn validate(&self, document: &Path, candidate: &[u8]) -> anyhow::Result<()> {
        let scratch = self
            .scratch_parent
            .join(format!(".staging-{}", std::process::id()));
        if scratch.exists() {
            std::fs::remove_dir_all(&scratch).ok();
        }

        let outcome = self.stage(&scratch, document, candidate).and_then(|()| {
            let root = scratch.to_string_lossy().into_owned();
            self.run(&["generate", "--root-dir", &root], self.validate_timeout)
        });

        if let Err(e) = std::fs::remove_dir_all(&scratch) {
            tracing::debug!("Could not remove {}: {}", scratch.display(), e);
        }

        let result = outcome?;
        if result.success {
            tracing::debug!("netplan generate accepted {}", document.display());
            Ok(())
        } else {
            Err(anyhow!("netplan generate: {}", result.failure_summary()))
        }
    }

    fn apply(&self) -> anyhow::Result<()> {
        let result = self.run(&["apply"], self.apply_timeout)?;
        if result.success {
            Ok(())
        } else {
            Err(anyhow!("netplan apply: {}", result.failure_summary()))
        }
    }
}
