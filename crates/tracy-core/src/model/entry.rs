use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::version::VersionNumber;

/// Number of hex characters shown for an abbreviated digest
pub const SHORT_HASH_LEN: usize = 8;

/// Abbreviate a digest for display
///
/// Counts characters, so a malformed non-ASCII value is cut safely.
pub fn short_hash(digest: &str) -> &str {
    match digest.char_indices().nth(SHORT_HASH_LEN) {
        Some((end, _)) => &digest[..end],
        None => digest,
    }
}

/// One snapshot of a tracked file
///
/// Entries are append-only: after creation only `is_latest` and
/// `is_current` ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// SHA-256 digest (hex) of the file content at capture time
    #[serde(rename = "hash")]
    pub content_hash: String,

    /// Absolute path the content was captured from
    #[serde(rename = "path")]
    pub tracked_path: PathBuf,

    pub version: VersionNumber,

    /// Most recently created entry for `tracked_path` in its project
    #[serde(rename = "latest", default)]
    pub is_latest: bool,

    /// Entry most recently written back to disk by a restore
    #[serde(rename = "current", default)]
    pub is_current: bool,

    /// Written as RFC 3339; zone-less ISO 8601 is read as local time
    #[serde(rename = "timestamp", deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "commit", default)]
    pub commit_message: String,

    #[serde(default)]
    pub label: Option<String>,
}

impl VersionEntry {
    /// Create a fresh entry stamped with the current time
    ///
    /// The entry starts out as latest and not current. An empty label is
    /// stored as no label.
    pub fn new(
        content_hash: String,
        tracked_path: PathBuf,
        version: VersionNumber,
        commit_message: String,
        label: Option<String>,
    ) -> Self {
        Self {
            content_hash,
            tracked_path,
            version,
            is_latest: true,
            is_current: false,
            created_at: Utc::now(),
            commit_message,
            label: label.filter(|l| !l.trim().is_empty()),
        }
    }

    /// Abbreviated digest for display
    pub fn short_hash(&self) -> &str {
        short_hash(&self.content_hash)
    }
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 and zone-less `YYYY-MM-DDTHH:MM:SS[.fff]`, which is
/// taken as local time.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc));
    // Skipped by a DST jump: no local reading exists, fall back to UTC.
    Some(local.unwrap_or_else(|| Utc.from_utc_datetime(&naive)))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {:?}", raw)))
}

/// A version entry together with the project that owns it
///
/// Produced by hash-prefix lookups so a caller can tell apart identical
/// digests captured in different projects or from different paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub project: String,
    pub entry: VersionEntry,
}

impl fmt::Display for VersionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} v{} ({})",
            self.project,
            self.entry.tracked_path.display(),
            self.entry.version,
            self.entry.short_hash()
        )
    }
}
