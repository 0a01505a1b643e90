//! Whole-file JSON persistence of the project registry

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracy_core::errors::TracyError;
use tracy_core::registry::ProjectRegistry;

use crate::cas::atomic::atomic_write;
use crate::errors::{io_error, Result};

/// Load/save boundary for the project registry
///
/// The engine reads and writes the registry only through this trait.
/// `RegistryFile` is the on-disk implementation.
pub trait RegistryStore: Send + Sync + std::fmt::Debug {
    /// Load the whole registry
    fn load(&self) -> Result<ProjectRegistry>;

    /// Replace the stored registry with `registry`
    fn save(&self, registry: &ProjectRegistry) -> Result<()>;

    /// Create an empty registry unless one is already stored
    fn ensure(&self) -> Result<()>;
}

/// The registry file on disk
///
/// Loaded and saved as a unit; a save replaces the file atomically so a
/// crash leaves either the old or the new registry, never a mix.
#[derive(Debug, Clone)]
pub struct RegistryFile {
    path: PathBuf,
}

impl RegistryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the registry; a missing file is an empty registry
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the file is not a valid registry and
    /// `Io` if it cannot be read.
    pub fn load(&self) -> Result<ProjectRegistry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No registry yet");
                return Ok(ProjectRegistry::new());
            }
            Err(e) => return Err(io_error("read_registry", &self.path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(ProjectRegistry::new());
        }

        serde_json::from_str(&raw).map_err(|e| TracyError::Serialization {
            message: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Write the whole registry, replacing the previous file
    pub fn save(&self, registry: &ProjectRegistry) -> Result<()> {
        let json = serde_json::to_string_pretty(registry)?;
        atomic_write(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "Saved registry");
        Ok(())
    }

    /// Create an empty registry file unless one exists
    pub fn ensure(&self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }
        self.save(&ProjectRegistry::new())
    }
}

impl RegistryStore for RegistryFile {
    fn load(&self) -> Result<ProjectRegistry> {
        RegistryFile::load(self)
    }

    fn save(&self, registry: &ProjectRegistry) -> Result<()> {
        RegistryFile::save(self, registry)
    }

    fn ensure(&self) -> Result<()> {
        RegistryFile::ensure(self)
    }
}
