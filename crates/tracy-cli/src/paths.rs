//! Turning command-line path arguments into tracked paths

use std::path::{Path, PathBuf};

use tracy_core::errors::TracyError;
use tracy_engine::search_file_name;

/// Absolute form of `path` relative to the working directory
///
/// Existing paths are canonicalized; missing ones are joined onto the
/// working directory as they are.
pub fn absolutize(path: &Path) -> Result<PathBuf, TracyError> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| TracyError::io("current_dir", ".", e))?;
    Ok(cwd.join(path))
}

/// Resolve the file a `create` argument refers to
///
/// A path that exists is used directly. A bare file name that does not
/// exist in the working directory is searched for below it.
pub fn resolve_source(arg: &Path) -> Result<PathBuf, TracyError> {
    if arg.exists() {
        return absolutize(arg);
    }
    match arg.to_str() {
        Some(name) if is_bare_name(arg) => {
            let cwd =
                std::env::current_dir().map_err(|e| TracyError::io("current_dir", ".", e))?;
            let found = search_file_name(&cwd, name)?;
            absolutize(&found)
        }
        _ => absolutize(arg),
    }
}

/// Normalize a `--path` filter: bare names stay as they are
pub fn scope_path(arg: &Path) -> Result<PathBuf, TracyError> {
    if is_bare_name(arg) {
        Ok(arg.to_path_buf())
    } else {
        absolutize(arg)
    }
}

fn is_bare_name(path: &Path) -> bool {
    tracy_engine::resolve::is_bare_name(path)
}
