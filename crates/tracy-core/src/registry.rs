use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TracyError};
use crate::model::{LastUsed, Project, VersionCandidate, VersionEntry};

/// In-memory registry of projects and their version history
///
/// Owns the per-path `is_latest`/`is_current` invariants: every mutation
/// goes through a single `&mut self` call so a half-applied flag update is
/// never observable. Not thread-safe; designed for single-actor use.
/// Persistence lives in `tracy-store`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRegistry {
    #[serde(default)]
    projects: BTreeMap<String, Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_used: Option<LastUsed>,
}

impl ProjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty project
    ///
    /// # Errors
    ///
    /// Returns `ProjectAlreadyExists` if the name is taken.
    pub fn create_project(&mut self, name: &str) -> Result<()> {
        if self.projects.contains_key(name) {
            return Err(TracyError::ProjectAlreadyExists {
                project: name.to_string(),
            });
        }
        self.projects.insert(name.to_string(), Project::new());
        Ok(())
    }

    /// Check whether a project is registered
    pub fn has_project(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Registered project names, sorted
    pub fn project_names(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    /// Get a project by name
    ///
    /// # Errors
    ///
    /// Returns `NoSuchProject` if the project is not registered.
    pub fn project(&self, name: &str) -> Result<&Project> {
        self.projects
            .get(name)
            .ok_or_else(|| TracyError::NoSuchProject {
                project: name.to_string(),
            })
    }

    fn project_mut(&mut self, name: &str) -> Result<&mut Project> {
        self.projects
            .get_mut(name)
            .ok_or_else(|| TracyError::NoSuchProject {
                project: name.to_string(),
            })
    }

    /// The latest entry for `path`, or `None` if it was never snapshotted
    ///
    /// # Errors
    ///
    /// Returns `NoSuchProject` if the project is not registered.
    pub fn latest_entry_for(&self, project: &str, path: &Path) -> Result<Option<&VersionEntry>> {
        Ok(self
            .project(project)?
            .entries_for(path)
            .into_iter()
            .find(|e| e.is_latest))
    }

    /// Append a new entry and make it the latest for its path
    ///
    /// Clears `is_latest` on every other entry of the same path; all other
    /// flags are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchProject` if the project is not registered; the
    /// registry is untouched in that case.
    pub fn append_entry(&mut self, project: &str, mut entry: VersionEntry) -> Result<&VersionEntry> {
        let project = self.project_mut(project)?;

        for existing in project
            .versions
            .iter_mut()
            .filter(|e| e.tracked_path == entry.tracked_path)
        {
            existing.is_latest = false;
        }

        entry.is_latest = true;
        project.versions.push(entry);

        // Just pushed, so the vector is non-empty.
        Ok(&project.versions[project.versions.len() - 1])
    }

    /// All entries for `path` in creation order
    ///
    /// # Errors
    ///
    /// Returns `NoSuchProject` if the project is not registered.
    pub fn entries_for(&self, project: &str, path: &Path) -> Result<Vec<&VersionEntry>> {
        Ok(self.project(project)?.entries_for(path))
    }

    /// Distinct paths tracked in a project, sorted
    ///
    /// # Errors
    ///
    /// Returns `NoSuchProject` if the project is not registered.
    pub fn tracked_paths(&self, project: &str) -> Result<Vec<PathBuf>> {
        Ok(self.project(project)?.tracked_paths())
    }

    /// Mark the entry with `digest` as the one currently on disk at `path`
    ///
    /// Every other entry of that path in the project loses `is_current`.
    /// When the same content was captured more than once, the most recent
    /// of those entries is the one marked.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchProject` for an unknown project and `EntryNotFound`
    /// if no entry of `path` carries `digest`. Nothing changes on error.
    pub fn mark_current(&mut self, project: &str, path: &Path, digest: &str) -> Result<()> {
        let name = project;
        let project = self.project_mut(name)?;

        let target = project
            .versions
            .iter()
            .rposition(|e| e.tracked_path == path && e.content_hash == digest)
            .ok_or_else(|| TracyError::EntryNotFound {
                project: name.to_string(),
                path: path.to_path_buf(),
                digest: digest.to_string(),
            })?;

        for (idx, entry) in project.versions.iter_mut().enumerate() {
            if entry.tracked_path == path {
                entry.is_current = idx == target;
            }
        }
        Ok(())
    }

    /// Every entry in every project whose digest starts with `prefix`
    ///
    /// Results are ordered by project name, then creation order. Ambiguity
    /// is left for the caller to resolve.
    pub fn find_by_hash_prefix(&self, prefix: &str) -> Vec<VersionCandidate> {
        self.projects
            .iter()
            .flat_map(|(name, project)| {
                project
                    .versions
                    .iter()
                    .filter(move |e| e.content_hash.starts_with(prefix))
                    .map(move |e| VersionCandidate {
                        project: name.clone(),
                        entry: e.clone(),
                    })
            })
            .collect()
    }

    /// (project, path) pairs whose tracked file name equals the file name of `name`
    pub fn find_tracked_by_name(&self, name: &str) -> Vec<(String, PathBuf)> {
        let wanted = match Path::new(name).file_name() {
            Some(file_name) => file_name.to_os_string(),
            None => return Vec::new(),
        };

        let mut matches = Vec::new();
        for (project_name, project) in &self.projects {
            for path in project.tracked_paths() {
                if path.file_name() == Some(wanted.as_os_str()) {
                    matches.push((project_name.clone(), path));
                }
            }
        }
        matches
    }

    /// The last (project, path) used by `create`, if any
    pub fn last_used(&self) -> Option<&LastUsed> {
        self.last_used.as_ref()
    }

    /// Remember the last (project, path) used by `create`
    pub fn set_last_used(&mut self, project: &str, path: &Path) {
        self.last_used = Some(LastUsed {
            project: project.to_string(),
            path: path.to_path_buf(),
        });
    }
}
