use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::entry::VersionEntry;

/// A named collection of version entries
///
/// `versions` is kept in creation order and is never reordered or pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries captured from `path`, oldest first
    pub fn entries_for(&self, path: &Path) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|e| e.tracked_path == path)
            .collect()
    }

    /// Distinct tracked paths, sorted
    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .versions
            .iter()
            .map(|e| e.tracked_path.clone())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

/// Project and file most recently used by `create`
///
/// Only a UI default: nothing in the registry depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUsed {
    pub project: String,
    #[serde(rename = "file")]
    pub path: PathBuf,
}
