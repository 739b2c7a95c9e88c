//! Backup identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout of backup identifiers; sorts chronologically as text.
const ID_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// Identifier of one backup, e.g. `20261016T093012345Z`.
///
/// Backups taken within the same millisecond get a `-N` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupId(String);

impl BackupId {
    /// Identifier for a backup taken at `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self(at.format(ID_FORMAT).to_string())
    }

    /// The next identifier after `self` for a same-millisecond collision.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    /// Accept only identifiers this module could have produced.
    pub fn parse(s: &str) -> Option<Self> {
        let base = s.split_once('-').map_or(s, |(base, suffix)| {
            if suffix.chars().all(|c| c.is_ascii_digit()) && !suffix.is_empty() {
                base
            } else {
                ""
            }
        });
        chrono::NaiveDateTime::parse_from_str(base, ID_FORMAT).ok()?;
        Some(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 12).unwrap()
            + chrono::Duration::milliseconds(345)
    }

    #[test]
    fn formats_as_sortable_timestamp() {
        assert_eq!(BackupId::at(sample_time()).as_str(), "20261016T093012345Z");
    }

    #[test]
    fn ids_sort_chronologically() {
        let earlier = BackupId::at(sample_time());
        let later = BackupId::at(sample_time() + chrono::Duration::seconds(1));
        assert!(earlier < later);
        assert!(earlier < earlier.with_suffix(1));
    }

    #[test]
    fn parse_accepts_generated_ids() {
        let id = BackupId::at(sample_time());
        assert_eq!(BackupId::parse(id.as_str()), Some(id.clone()));
        let suffixed = id.with_suffix(2);
        assert_eq!(BackupId::parse(suffixed.as_str()), Some(suffixed));
    }

    #[test]
    fn parse_rejects_other_names() {
        assert_eq!(BackupId::parse("latest"), None);
        assert_eq!(BackupId::parse("../etc/passwd"), None);
        assert_eq!(BackupId::parse("20261016T093012345Z-x"), None);
    }
}
