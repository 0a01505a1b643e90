//! Locating a file to snapshot by its bare file name

use std::path::{Path, PathBuf};

use tracy_core::errors::{Result, TracyError};

/// Find files named `name` anywhere below `root`
///
/// Hidden directories are skipped and symlinks are not followed. Matches
/// are returned joined onto `root`, sorted.
pub fn find_files_named(root: &Path, name: &str) -> Vec<PathBuf> {
    let mut matches: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == name)
        .map(walkdir::DirEntry::into_path)
        .collect();
    matches.sort();
    matches
}

/// Resolve a bare file name to the single file below `root` it refers to
///
/// # Errors
///
/// - `SourceNotFound` if no file has that name
/// - `AmbiguousTrackedPath` listing every match if several do
pub fn search_file_name(root: &Path, name: &str) -> Result<PathBuf> {
    let mut matches = find_files_named(root, name);
    tracing::debug!(file_name = name, match_count = matches.len(), "Searched for file name");

    match matches.len() {
        0 => Err(TracyError::SourceNotFound {
            path: PathBuf::from(name),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(TracyError::AmbiguousTrackedPath {
            name: name.to_string(),
            candidates: matches,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_single_nested_match() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/notes.md"), b"x").unwrap();
        fs::write(dir.path().join("other.md"), b"y").unwrap();

        let found = search_file_name(dir.path(), "notes.md").unwrap();

        assert_eq!(found, dir.path().join("a/b/notes.md"));
    }

    #[test]
    fn test_several_matches_are_ambiguous() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::create_dir_all(dir.path().join("y")).unwrap();
        fs::write(dir.path().join("x/notes.md"), b"1").unwrap();
        fs::write(dir.path().join("y/notes.md"), b"2").unwrap();

        let err = search_file_name(dir.path(), "notes.md").unwrap_err();

        match err {
            TracyError::AmbiguousTrackedPath { candidates, .. } => {
                assert_eq!(
                    candidates,
                    vec![dir.path().join("x/notes.md"), dir.path().join("y/notes.md")]
                );
            }
            other => panic!("expected AmbiguousTrackedPath, got {:?}", other),
        }
    }

    #[test]
    fn test_hidden_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), b"x").unwrap();

        let err = search_file_name(dir.path(), "config").unwrap_err();

        assert!(matches!(err, TracyError::SourceNotFound { .. }));
    }

    #[test]
    fn test_directories_with_the_name_do_not_match() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("notes.md")).unwrap();

        assert!(find_files_named(dir.path(), "notes.md").is_empty());
    }
}
