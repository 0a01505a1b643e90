//! Resolution of a hash prefix to the single version a restore should use

use std::path::{Path, PathBuf};

use tracy_core::errors::{Result, TracyError};
use tracy_core::VersionCandidate;

/// Optional narrowing of a restore lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreScope {
    /// Only consider versions of this project
    pub project: Option<String>,
    /// Only consider versions of this tracked path
    ///
    /// A bare file name matches by file name; anything else must equal the
    /// tracked path.
    pub path: Option<PathBuf>,
}

impl RestoreScope {
    pub fn new(project: Option<String>, path: Option<PathBuf>) -> Self {
        Self { project, path }
    }

    fn admits(&self, candidate: &VersionCandidate) -> bool {
        if let Some(project) = &self.project {
            if &candidate.project != project {
                return false;
            }
        }
        match &self.path {
            Some(path) => path_matches(path, &candidate.entry.tracked_path),
            None => true,
        }
    }
}

fn path_matches(filter: &Path, tracked: &Path) -> bool {
    if is_bare_name(filter) {
        tracked.file_name() == filter.file_name()
    } else {
        tracked == filter
    }
}

/// Whether `path` is a single file name with no directory part
pub fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && path.file_name().is_some() && !path.has_root()
}

/// Pick the one version a prefix lookup refers to
///
/// Candidates outside `scope` are dropped. Several entries with the same
/// project, path and digest hold identical content and count as one; the
/// newest of them is kept.
///
/// # Errors
///
/// - `HashNotFound` if nothing in scope matches
/// - `AmbiguousHash` carrying the distinct candidates if more than one remains
pub fn resolve_restore_target(
    prefix: &str,
    candidates: Vec<VersionCandidate>,
    scope: &RestoreScope,
) -> Result<VersionCandidate> {
    let mut distinct: Vec<VersionCandidate> = Vec::new();
    for candidate in candidates.into_iter().filter(|c| scope.admits(c)) {
        let duplicate = distinct.iter_mut().find(|d| {
            d.project == candidate.project
                && d.entry.tracked_path == candidate.entry.tracked_path
                && d.entry.content_hash == candidate.entry.content_hash
        });
        match duplicate {
            Some(existing) => *existing = candidate,
            None => distinct.push(candidate),
        }
    }

    match distinct.len() {
        0 => Err(TracyError::HashNotFound {
            prefix: prefix.to_string(),
        }),
        1 => Ok(distinct.remove(0)),
        _ => Err(TracyError::AmbiguousHash {
            prefix: prefix.to_string(),
            candidates: distinct,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracy_core::{VersionEntry, VersionNumber};

    fn candidate(project: &str, path: &str, hash: &str, patch: u32) -> VersionCandidate {
        VersionCandidate {
            project: project.to_string(),
            entry: VersionEntry::new(
                hash.to_string(),
                PathBuf::from(path),
                VersionNumber::new(1, 0, patch),
                String::new(),
                None,
            ),
        }
    }

    #[test]
    fn test_single_match_resolves() {
        let found = resolve_restore_target(
            "ab",
            vec![candidate("demo", "/a.txt", "abcd", 0)],
            &RestoreScope::default(),
        )
        .unwrap();
        assert_eq!(found.project, "demo");
    }

    #[test]
    fn test_no_match_is_not_found() {
        let err = resolve_restore_target("ab", Vec::new(), &RestoreScope::default()).unwrap_err();
        assert!(matches!(err, TracyError::HashNotFound { .. }));
    }

    #[test]
    fn test_cross_project_match_is_ambiguous() {
        let err = resolve_restore_target(
            "ab",
            vec![
                candidate("one", "/a.txt", "abcd", 0),
                candidate("two", "/a.txt", "abcd", 0),
            ],
            &RestoreScope::default(),
        )
        .unwrap_err();

        match err {
            TracyError::AmbiguousHash { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("expected AmbiguousHash, got {:?}", other),
        }
    }

    #[test]
    fn test_project_scope_disambiguates() {
        let found = resolve_restore_target(
            "ab",
            vec![
                candidate("one", "/a.txt", "abcd", 0),
                candidate("two", "/a.txt", "abcd", 0),
            ],
            &RestoreScope::new(Some("two".to_string()), None),
        )
        .unwrap();
        assert_eq!(found.project, "two");
    }

    #[test]
    fn test_path_scope_by_file_name_or_full_path() {
        let candidates = vec![
            candidate("demo", "/x/a.txt", "ab01", 0),
            candidate("demo", "/y/b.txt", "ab02", 0),
        ];

        let by_name = resolve_restore_target(
            "ab",
            candidates.clone(),
            &RestoreScope::new(None, Some(PathBuf::from("b.txt"))),
        )
        .unwrap();
        assert_eq!(by_name.entry.content_hash, "ab02");

        let by_path = resolve_restore_target(
            "ab",
            candidates,
            &RestoreScope::new(None, Some(PathBuf::from("/x/a.txt"))),
        )
        .unwrap();
        assert_eq!(by_path.entry.content_hash, "ab01");
    }

    #[test]
    fn test_repeated_capture_counts_once_and_keeps_newest() {
        let found = resolve_restore_target(
            "ab",
            vec![
                candidate("demo", "/a.txt", "abcd", 0),
                candidate("demo", "/a.txt", "abcd", 2),
            ],
            &RestoreScope::default(),
        )
        .unwrap();
        assert_eq!(found.entry.version, VersionNumber::new(1, 0, 2));
    }

    #[test]
    fn test_is_bare_name() {
        assert!(is_bare_name(Path::new("notes.md")));
        assert!(!is_bare_name(Path::new("docs/notes.md")));
        assert!(!is_bare_name(Path::new("/notes.md")));
        assert!(!is_bare_name(Path::new("..")));
    }
}
