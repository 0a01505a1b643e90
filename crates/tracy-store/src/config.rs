//! Location of Tracy's on-disk state
//!
//! Resolved once at startup and passed down explicitly; nothing below the
//! CLI reads the environment.

use std::fs;
use std::path::{Path, PathBuf};

use tracy_core::errors::TracyError;

use crate::errors::{io_error, Result};

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "TRACY_HOME";

/// Directory created under the user's home when nothing else is given
pub const DEFAULT_DIR_NAME: &str = ".tracy";

const OBJECTS_DIR: &str = "objects";
const REGISTRY_FILE: &str = "tracy.json";

/// Home, object store and registry locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracyConfig {
    home: PathBuf,
}

impl TracyConfig {
    /// Use `home` as the root of all state
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the home from an explicit flag, `TRACY_HOME`, or `~/.tracy`
    ///
    /// # Errors
    ///
    /// Returns `Config` when none of the sources yield a directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let env = std::env::var_os(HOME_ENV).map(PathBuf::from);
        Self::resolve_with(explicit, env, dirs::home_dir())
    }

    /// Resolution with every source supplied by the caller
    ///
    /// Empty paths count as unset.
    ///
    /// # Errors
    ///
    /// Returns `Config` when none of the sources yield a directory.
    pub fn resolve_with(
        explicit: Option<PathBuf>,
        env: Option<PathBuf>,
        user_home: Option<PathBuf>,
    ) -> Result<Self> {
        let non_empty = |p: &PathBuf| !p.as_os_str().is_empty();

        if let Some(home) = explicit.filter(non_empty) {
            return Ok(Self::new(home));
        }
        if let Some(home) = env.filter(non_empty) {
            return Ok(Self::new(home));
        }
        user_home
            .filter(non_empty)
            .map(|home| Self::new(home.join(DEFAULT_DIR_NAME)))
            .ok_or_else(|| TracyError::Config {
                message: format!(
                    "cannot determine a home directory; pass --home or set {}",
                    HOME_ENV
                ),
            })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding the content-addressed blobs
    pub fn objects_dir(&self) -> PathBuf {
        self.home.join(OBJECTS_DIR)
    }

    /// JSON file holding the project registry
    pub fn registry_path(&self) -> PathBuf {
        self.home.join(REGISTRY_FILE)
    }

    /// Create the home and objects directories if missing
    pub fn ensure_layout(&self) -> Result<()> {
        let objects = self.objects_dir();
        fs::create_dir_all(&objects).map_err(|e| io_error("create_dir", &objects, e))?;
        tracing::debug!(home = %self.home.display(), "Layout ready");
        Ok(())
    }
}
