//! Backup storage.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{NsplanError, Result};
use crate::system::{write_atomic, PRIVATE_MODE};

use super::BackupId;

/// Selector that resolves to the most recent backup.
pub const LATEST: &str = "latest";

const INDEX_FILE: &str = "index.yml";

/// Metadata of one stored backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: BackupId,
    /// Document the backup was taken from.
    pub source: PathBuf,
    /// Whether the document existed; restoring an absent one removes it.
    pub existed: bool,
    pub sha256: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// On-disk index of all backups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BackupIndex {
    latest: Option<BackupId>,
    #[serde(default)]
    backups: Vec<BackupRecord>,
}

/// Directory of verbatim document copies plus `index.yml`.
///
/// Backups are never deleted by nsplan.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn backup_path(&self, id: &BackupId) -> PathBuf {
        self.dir.join(format!("{}.yaml", id))
    }

    fn load_index(&self) -> Result<BackupIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(BackupIndex::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content).map_err(|e| NsplanError::ConfigParseError {
            path,
            message: e.to_string(),
        })
    }

    fn save_index(&self, index: &BackupIndex) -> Result<()> {
        let content = serde_yaml::to_string(index).map_err(|e| NsplanError::Other(e.into()))?;
        write_atomic(&self.index_path(), content.as_bytes(), PRIVATE_MODE)
    }

    fn unused_id(&self, index: &BackupIndex, now: DateTime<Utc>) -> BackupId {
        let base = BackupId::at(now);
        let taken = |id: &BackupId| {
            index.backups.iter().any(|r| &r.id == id) || self.backup_path(id).exists()
        };

        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = base.with_suffix(n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Store a verbatim copy of `source` and make it the latest backup.
    ///
    /// `content` is `None` when the document does not exist yet; the record
    /// then remembers that restoring it means removing the document.
    pub fn create(&self, source: &Path, content: Option<&[u8]>) -> Result<BackupRecord> {
        fs::create_dir_all(&self.dir)?;
        let mut index = self.load_index()?;

        let now = Utc::now();
        let id = self.unused_id(&index, now);
        let bytes = content.unwrap_or_default();

        write_atomic(&self.backup_path(&id), bytes, PRIVATE_MODE)?;

        let record = BackupRecord {
            id: id.clone(),
            source: source.to_path_buf(),
            existed: content.is_some(),
            sha256: sha256_hex(bytes),
            size: bytes.len() as u64,
            created_at: now,
        };

        index.backups.push(record.clone());
        index.latest = Some(id);
        self.save_index(&index)?;

        tracing::info!(
            "Backed up {} to {}",
            source.display(),
            self.backup_path(&record.id).display()
        );
        Ok(record)
    }

    /// All backups, newest first.
    pub fn list(&self) -> Result<Vec<BackupRecord>> {
        let mut records = self.load_index()?.backups;
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    /// The backup the `latest` pointer refers to.
    pub fn latest(&self) -> Result<Option<BackupRecord>> {
        let index = self.load_index()?;
        let Some(latest) = index.latest else {
            return Ok(None);
        };
        Ok(index.backups.into_iter().find(|r| r.id == latest))
    }

    /// Look up a backup by identifier or [`LATEST`].
    pub fn get(&self, selector: &str) -> Result<BackupRecord> {
        let not_found = || NsplanError::BackupNotFound {
            id: selector.to_string(),
        };

        if selector.eq_ignore_ascii_case(LATEST) {
            return self.latest()?.ok_or_else(not_found);
        }

        let id = BackupId::parse(selector).ok_or_else(not_found)?;
        self.load_index()?
            .backups
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(not_found)
    }

    /// Read a backup's bytes, checking them against the recorded digest.
    pub fn read_verified(&self, record: &BackupRecord) -> Result<Vec<u8>> {
        let path = self.backup_path(&record.id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NsplanError::BackupNotFound {
                    id: record.id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let actual = sha256_hex(&bytes);
        if actual != record.sha256 {
            return Err(NsplanError::BackupCorrupted {
                id: record.id.to_string(),
                expected: record.sha256.clone(),
                actual,
            });
        }
        Ok(bytes)
    }
}
