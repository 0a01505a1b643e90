//! Snapshot orchestration: create and restore with boundary logging.
//!
//! Each call loads the registry file, applies one operation to the
//! in-memory `ProjectRegistry` and writes the whole file back. Blobs are
//! always written before the registry entry that references them, so an
//! interrupted create leaves at worst an unreferenced blob.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracy_core::errors::{Result, TracyError};
use tracy_core::{
    bump, log_op_end, log_op_error, log_op_start, BumpLevel, LastUsed, ProjectRegistry,
    VersionCandidate, VersionEntry,
};
use tracy_store::cas::validate_hex_prefix;
use tracy_store::{FsStore, RegistryFile, RegistryStore, TracyConfig};

use crate::resolve::{resolve_restore_target, RestoreScope};

/// Outcome of `init_project`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectInit {
    Created,
    /// The project was already registered; nothing changed
    AlreadyExists,
}

/// A version that was written back to its tracked path
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredVersion {
    pub project: String,
    /// The restored entry, now flagged current
    pub entry: VersionEntry,
    pub size_bytes: u64,
}

impl RestoredVersion {
    pub fn tracked_path(&self) -> &Path {
        &self.entry.tracked_path
    }
}

/// Entry point for every Tracy operation
#[derive(Debug, Clone)]
pub struct SnapshotService {
    config: TracyConfig,
    store: FsStore,
    registry: Arc<dyn RegistryStore>,
}

impl SnapshotService {
    /// Build a service over the locations in `config` without touching disk
    pub fn new(config: TracyConfig) -> Self {
        let registry = Arc::new(RegistryFile::new(config.registry_path()));
        Self::with_registry(config, registry)
    }

    /// Build a service that keeps its registry in `registry` instead of the
    /// file under the home directory
    pub fn with_registry(config: TracyConfig, registry: Arc<dyn RegistryStore>) -> Self {
        let store = FsStore::new(config.objects_dir());
        Self {
            config,
            store,
            registry,
        }
    }

    /// Build a service and make sure its directories and registry file exist
    pub fn open(config: TracyConfig) -> Result<Self> {
        let service = Self::new(config);
        service.config.ensure_layout()?;
        service.registry.ensure()?;
        Ok(service)
    }

    pub fn store(&self) -> &FsStore {
        &self.store
    }

    /// Directory holding the stored blobs
    pub fn objects_dir(&self) -> &Path {
        self.store.root()
    }

    // ===== Projects =====

    /// Register a project; an existing project is left as it is
    pub fn init_project(&self, project: &str) -> Result<ProjectInit> {
        log_op_start!("init_project", project = project);
        let start = Instant::now();

        let result = self.init_project_impl(project).map_err(|e| {
            log_op_error!(
                "init_project",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "init_project",
            duration_ms = start.elapsed().as_millis() as u64,
            outcome = ?result
        );
        Ok(result)
    }

    fn init_project_impl(&self, project: &str) -> Result<ProjectInit> {
        let mut registry = self.registry.load()?;
        match registry.create_project(project) {
            Ok(()) => {}
            Err(TracyError::ProjectAlreadyExists { .. }) => return Ok(ProjectInit::AlreadyExists),
            Err(e) => return Err(e),
        }
        self.registry.save(&registry)?;
        Ok(ProjectInit::Created)
    }

    /// Whether `project` is registered
    pub fn has_project(&self, project: &str) -> Result<bool> {
        self.query("has_project", |registry| Ok(registry.has_project(project)))
    }

    /// Registered project names, sorted
    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.query("list_projects", |registry| {
            Ok(registry
                .project_names()
                .into_iter()
                .map(str::to_string)
                .collect())
        })
    }

    // ===== Create =====

    /// Capture the current content of `tracked_path` as a new version
    ///
    /// The blob is stored only if its digest is new; the entry becomes the
    /// latest for its path and the (project, path) pair becomes last used.
    ///
    /// # Errors
    ///
    /// - `NoSuchProject` if `project` is not registered (nothing is stored)
    /// - `SourceNotFound` if `tracked_path` is not a readable file
    /// - `Io`/`Serialization` on store or registry failures
    pub fn create_snapshot(
        &self,
        project: &str,
        tracked_path: &Path,
        level: BumpLevel,
        commit_message: &str,
        label: Option<&str>,
    ) -> Result<VersionEntry> {
        log_op_start!(
            "create_snapshot",
            project = project,
            tracked_path = %tracked_path.display(),
            level = %level
        );
        let start = Instant::now();

        let entry = self
            .create_snapshot_impl(project, tracked_path, level, commit_message, label)
            .map_err(|e| {
                log_op_error!(
                    "create_snapshot",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    project = project
                );
                e
            })?;

        log_op_end!(
            "create_snapshot",
            duration_ms = start.elapsed().as_millis() as u64,
            project = project,
            version = %entry.version,
            digest = %entry.content_hash
        );
        Ok(entry)
    }

    fn create_snapshot_impl(
        &self,
        project: &str,
        tracked_path: &Path,
        level: BumpLevel,
        commit_message: &str,
        label: Option<&str>,
    ) -> Result<VersionEntry> {
        let mut registry = self.registry.load()?;
        registry.project(project)?;

        if !tracked_path.is_file() {
            return Err(TracyError::SourceNotFound {
                path: tracked_path.to_path_buf(),
            });
        }

        let mut digest = self.store.digest_file(tracked_path)?;
        if !self.store.contains(&digest) {
            // The file may change between hashing and storing; the stored
            // bytes decide the identity.
            digest = self.store.put_file(tracked_path)?;
        }

        let previous = registry
            .latest_entry_for(project, tracked_path)?
            .map(|e| e.version);
        let entry = VersionEntry::new(
            digest,
            tracked_path.to_path_buf(),
            bump(previous, level)?,
            commit_message.to_string(),
            label.map(str::to_string),
        );

        let appended = registry.append_entry(project, entry)?.clone();
        registry.set_last_used(project, tracked_path);
        self.registry.save(&registry)?;

        Ok(appended)
    }

    // ===== History =====

    /// Every version of `tracked_path` in `project`, oldest first
    ///
    /// # Errors
    ///
    /// `NoSuchProject` for an unknown project, `PathNotTracked` if the path
    /// has no versions.
    pub fn history(&self, project: &str, tracked_path: &Path) -> Result<Vec<VersionEntry>> {
        self.query("history", |registry| {
            let entries: Vec<VersionEntry> = registry
                .entries_for(project, tracked_path)?
                .into_iter()
                .cloned()
                .collect();
            if entries.is_empty() {
                return Err(TracyError::PathNotTracked {
                    project: project.to_string(),
                    path: tracked_path.to_path_buf(),
                });
            }
            Ok(entries)
        })
    }

    /// History of the file in `project` that `file` names
    ///
    /// `file` is taken as a tracked path if one matches exactly, otherwise
    /// it is matched by file name against the project's tracked paths.
    ///
    /// # Errors
    ///
    /// `PathNotTracked` if nothing matches, `AmbiguousTrackedPath` if the
    /// file name belongs to several tracked paths.
    pub fn history_for_file(
        &self,
        project: &str,
        file: &Path,
    ) -> Result<(PathBuf, Vec<VersionEntry>)> {
        let tracked = self.tracked_paths(project)?;
        let path = pick_tracked_path(project, file, tracked)?;
        let entries = self.history(project, &path)?;
        Ok((path, entries))
    }

    /// Distinct paths tracked in `project`, sorted
    pub fn tracked_paths(&self, project: &str) -> Result<Vec<PathBuf>> {
        self.query("tracked_paths", |registry| registry.tracked_paths(project))
    }

    /// (project, path) pairs across all projects whose file name matches `name`
    pub fn find_tracked_by_name(&self, name: &str) -> Result<Vec<(String, PathBuf)>> {
        self.query("find_tracked_by_name", |registry| {
            Ok(registry.find_tracked_by_name(name))
        })
    }

    /// The (project, path) most recently used by `create_snapshot`
    pub fn last_used(&self) -> Result<Option<LastUsed>> {
        self.query("last_used", |registry| Ok(registry.last_used().cloned()))
    }

    // ===== Restore =====

    /// Resolve a digest or digest prefix without touching any file
    ///
    /// # Errors
    ///
    /// `InvalidDigest` for a non-hex prefix, `HashNotFound` or
    /// `AmbiguousHash` as in `restore`.
    pub fn resolve_version(&self, prefix: &str, scope: &RestoreScope) -> Result<VersionCandidate> {
        let prefix = normalize_prefix(prefix)?;
        self.query("resolve_version", |registry| {
            resolve_restore_target(&prefix, registry.find_by_hash_prefix(&prefix), scope)
        })
    }

    /// Write a stored version back to its tracked path and mark it current
    ///
    /// # Errors
    ///
    /// - `HashNotFound` if no version in scope matches `prefix`
    /// - `AmbiguousHash` with the candidates if several do
    /// - `MissingBlob` / `CorruptBlob` if the blob is absent or damaged;
    ///   the tracked file is untouched
    /// - `RestoreMetadataFailed` if the file was rewritten but the registry
    ///   could not be updated
    pub fn restore(&self, prefix: &str, scope: &RestoreScope) -> Result<RestoredVersion> {
        log_op_start!("restore", prefix = prefix);
        let start = Instant::now();

        let restored = self.restore_impl(prefix, scope).map_err(|e| {
            log_op_error!(
                "restore",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "restore",
            duration_ms = start.elapsed().as_millis() as u64,
            project = restored.project.as_str(),
            tracked_path = %restored.entry.tracked_path.display(),
            digest = %restored.entry.content_hash,
            size_bytes = restored.size_bytes
        );
        Ok(restored)
    }

    fn restore_impl(&self, prefix: &str, scope: &RestoreScope) -> Result<RestoredVersion> {
        let prefix = normalize_prefix(prefix)?;
        let mut registry = self.registry.load()?;

        let chosen = resolve_restore_target(&prefix, registry.find_by_hash_prefix(&prefix), scope)?;
        let VersionCandidate { project, mut entry } = chosen;

        if !self.store.contains(&entry.content_hash) {
            return Err(TracyError::MissingBlob {
                digest: entry.content_hash,
            });
        }

        let size_bytes = self
            .store
            .restore_to(&entry.content_hash, &entry.tracked_path)?;

        // The file on disk now holds the restored content.
        self.record_current(&mut registry, &project, &entry)
            .map_err(|e| TracyError::RestoreMetadataFailed {
                tracked_path: entry.tracked_path.clone(),
                message: e.to_string(),
            })?;

        entry.is_current = true;
        Ok(RestoredVersion {
            project,
            entry,
            size_bytes,
        })
    }

    fn record_current(
        &self,
        registry: &mut ProjectRegistry,
        project: &str,
        entry: &VersionEntry,
    ) -> Result<()> {
        registry.mark_current(project, &entry.tracked_path, &entry.content_hash)?;
        self.registry.save(registry)
    }

    /// Run a read-only lookup against a freshly loaded registry
    fn query<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&ProjectRegistry) -> Result<T>,
    ) -> Result<T> {
        log_op_start!(op);
        let start = Instant::now();

        let result = self.registry.load().and_then(|registry| f(&registry));
        match &result {
            Ok(_) => {
                log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
            }
            Err(e) => {
                log_op_error!(
                    op,
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
            }
        }
        result
    }
}

fn normalize_prefix(prefix: &str) -> Result<String> {
    let prefix = prefix.trim().to_ascii_lowercase();
    validate_hex_prefix(&prefix)?;
    Ok(prefix)
}

fn pick_tracked_path(project: &str, file: &Path, tracked: Vec<PathBuf>) -> Result<PathBuf> {
    if tracked.iter().any(|p| p == file) {
        return Ok(file.to_path_buf());
    }

    let wanted = match file.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            return Err(TracyError::PathNotTracked {
                project: project.to_string(),
                path: file.to_path_buf(),
            })
        }
    };

    let mut matches: Vec<PathBuf> = tracked
        .into_iter()
        .filter(|p| p.file_name() == Some(wanted.as_os_str()))
        .collect();

    match matches.len() {
        0 => Err(TracyError::PathNotTracked {
            project: project.to_string(),
            path: file.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(TracyError::AmbiguousTrackedPath {
            name: wanted.to_string_lossy().into_owned(),
            candidates: matches,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_tracked_path_exact_then_by_name() {
        let tracked = vec![PathBuf::from("/x/a.txt"), PathBuf::from("/y/b.txt")];

        assert_eq!(
            pick_tracked_path("demo", Path::new("/x/a.txt"), tracked.clone()).unwrap(),
            PathBuf::from("/x/a.txt")
        );
        assert_eq!(
            pick_tracked_path("demo", Path::new("b.txt"), tracked.clone()).unwrap(),
            PathBuf::from("/y/b.txt")
        );
        assert!(matches!(
            pick_tracked_path("demo", Path::new("c.txt"), tracked),
            Err(TracyError::PathNotTracked { .. })
        ));
    }

    #[test]
    fn test_pick_tracked_path_ambiguous_name() {
        let tracked = vec![PathBuf::from("/x/a.txt"), PathBuf::from("/y/a.txt")];

        let err = pick_tracked_path("demo", Path::new("a.txt"), tracked).unwrap_err();

        assert!(matches!(err, TracyError::AmbiguousTrackedPath { .. }));
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(" ABcd ").unwrap(), "abcd");
        assert!(matches!(
            normalize_prefix("zz"),
            Err(TracyError::InvalidDigest { .. })
        ));
        assert!(normalize_prefix("").is_err());
    }
}
