use std::path::PathBuf;

use thiserror::Error;

use crate::model::VersionCandidate;

/// Result type alias using TracyError
pub type Result<T> = std::result::Result<T, TracyError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// A stable classification of every error Tracy can report. Each kind maps
/// to a stable code used by the CLI for exit status selection, by the
/// logging facility, and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NoSuchProject,
    AlreadyExists,
    SourceNotFound,
    NotFound,

    // Disambiguation
    AmbiguousHash,
    AmbiguousSelection,

    // Store consistency
    MissingBlob,
    CorruptBlob,
    /// The tracked file was rewritten but the registry could not be updated
    PartialRestore,

    // Input
    InvalidInput,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NoSuchProject => "ERR_NO_SUCH_PROJECT",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::SourceNotFound => "ERR_SOURCE_NOT_FOUND",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousHash => "ERR_AMBIGUOUS_HASH",
            ExErrorKind::AmbiguousSelection => "ERR_AMBIGUOUS_SELECTION",
            ExErrorKind::MissingBlob => "ERR_MISSING_BLOB",
            ExErrorKind::CorruptBlob => "ERR_CORRUPT_BLOB",
            ExErrorKind::PartialRestore => "ERR_PARTIAL_RESTORE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the context
/// needed to explain the failure to a user.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    project: Option<String>,
    tracked_path: Option<PathBuf>,
    digest: Option<String>,
    message: String,
    candidates: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            project: None,
            tracked_path: None,
            digest: None,
            message: String::new(),
            candidates: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add project context
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Add tracked path context
    pub fn with_tracked_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tracked_path = Some(path.into());
        self
    }

    /// Add digest context
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add human-readable candidates (ambiguous hash or path lookups)
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the project context, if any
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Get the tracked path context, if any
    pub fn tracked_path(&self) -> Option<&std::path::Path> {
        self.tracked_path.as_deref()
    }

    /// Get the digest context, if any
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get candidates, if any
    pub fn candidates(&self) -> Option<&[String]> {
        self.candidates.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(project) = &self.project {
            write!(f, " (project: {})", project)?;
        }
        if let Some(path) = &self.tracked_path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(digest) = &self.digest {
            write!(f, " (digest: {})", digest)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for Tracy operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TracyError {
    // ===== Registry Errors =====
    /// Operation referenced an unregistered project
    #[error("Project not found: {project}")]
    NoSuchProject { project: String },

    /// Project name is already registered
    #[error("Project already exists: {project}")]
    ProjectAlreadyExists { project: String },

    /// The path has never been snapshotted in the project
    #[error("No versions of {} in project {project}", .path.display())]
    PathNotTracked { project: String, path: PathBuf },

    /// No tracked file in any project has this file name
    #[error("No tracked file named {name}")]
    FileNameNotFound { name: String },

    /// No entry in the project/path carries this digest
    #[error("No version of {} in project {project} has digest {digest}", .path.display())]
    EntryNotFound {
        project: String,
        path: PathBuf,
        digest: String,
    },

    // ===== Lookup Errors =====
    /// File to snapshot does not exist
    #[error("Source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// No version matched the hash prefix
    #[error("No version found matching hash {prefix}")]
    HashNotFound { prefix: String },

    /// No blob stored under the digest
    #[error("Blob not found: {digest}")]
    BlobNotFound { digest: String },

    /// Hash prefix matched several versions
    #[error("Hash {prefix} matches {} versions", .candidates.len())]
    AmbiguousHash {
        prefix: String,
        candidates: Vec<VersionCandidate>,
    },

    /// File name matched several files on disk or in the registry
    #[error("File name {name} matches {} files", .candidates.len())]
    AmbiguousTrackedPath {
        name: String,
        candidates: Vec<PathBuf>,
    },

    // ===== Store Consistency Errors =====
    /// Registry references a digest that the content store lacks
    #[error("Stored version not found in objects store (hash {digest})")]
    MissingBlob { digest: String },

    /// Blob content does not hash to its own name
    #[error("Blob {digest} is corrupt: content hashes to {actual}")]
    CorruptBlob { digest: String, actual: String },

    /// The file on disk was restored but the registry update failed
    #[error("{} was restored but its version metadata was not updated: {message}", .tracked_path.display())]
    RestoreMetadataFailed {
        tracked_path: PathBuf,
        message: String,
    },

    // ===== Validation Errors =====
    /// Value is not a usable digest or digest prefix
    #[error("Invalid digest {value:?}: {reason}")]
    InvalidDigest { value: String, reason: String },

    /// Value is not a `major.minor.patch` version
    #[error("Invalid version {value:?}")]
    InvalidVersion { value: String },

    /// A version component has no room left for another bump
    #[error("Version {version} cannot take another {level} bump")]
    VersionOverflow { version: String, level: String },

    /// Configuration could not be resolved
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ===== Generic Errors =====
    /// Underlying filesystem failure
    #[error("I/O error during {op} on {}: {message}", .path.display())]
    Io {
        op: String,
        path: PathBuf,
        message: String,
    },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl TracyError {
    /// Wrap an `std::io::Error` with the operation and path it came from
    pub fn io(op: &str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        TracyError::Io {
            op: op.to_string(),
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the on-disk tracked file already reflects the requested restore
    pub fn file_was_restored(&self) -> bool {
        matches!(self, TracyError::RestoreMetadataFailed { .. })
    }
}

impl From<serde_json::Error> for TracyError {
    fn from(err: serde_json::Error) -> Self {
        TracyError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from TracyError to ExError
impl From<TracyError> for ExError {
    fn from(err: TracyError) -> Self {
        let message = err.to_string();
        match err {
            TracyError::NoSuchProject { project } => ExError::new(ExErrorKind::NoSuchProject)
                .with_project(project)
                .with_message(message),
            TracyError::ProjectAlreadyExists { project } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_project(project)
                    .with_message(message)
            }
            TracyError::PathNotTracked { project, path } => ExError::new(ExErrorKind::NotFound)
                .with_project(project)
                .with_tracked_path(path)
                .with_message(message),
            TracyError::FileNameNotFound { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }
            TracyError::EntryNotFound {
                project,
                path,
                digest,
            } => ExError::new(ExErrorKind::NotFound)
                .with_project(project)
                .with_tracked_path(path)
                .with_digest(digest)
                .with_message(message),
            TracyError::SourceNotFound { path } => ExError::new(ExErrorKind::SourceNotFound)
                .with_tracked_path(path)
                .with_message(message),
            TracyError::HashNotFound { prefix } => ExError::new(ExErrorKind::NotFound)
                .with_digest(prefix)
                .with_message(message),
            TracyError::BlobNotFound { digest } => ExError::new(ExErrorKind::NotFound)
                .with_op("cas_read")
                .with_digest(digest)
                .with_message(message),
            TracyError::AmbiguousHash { prefix, candidates } => {
                ExError::new(ExErrorKind::AmbiguousHash)
                    .with_digest(prefix)
                    .with_candidates(candidates.iter().map(|c| c.to_string()).collect())
                    .with_message(message)
            }
            TracyError::AmbiguousTrackedPath { candidates, .. } => {
                ExError::new(ExErrorKind::AmbiguousSelection)
                    .with_candidates(
                        candidates
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect(),
                    )
                    .with_message(message)
            }
            TracyError::MissingBlob { digest } => ExError::new(ExErrorKind::MissingBlob)
                .with_digest(digest)
                .with_message(message),
            TracyError::CorruptBlob { digest, .. } => ExError::new(ExErrorKind::CorruptBlob)
                .with_digest(digest)
                .with_message(message),
            TracyError::RestoreMetadataFailed { tracked_path, .. } => {
                ExError::new(ExErrorKind::PartialRestore)
                    .with_op("restore")
                    .with_tracked_path(tracked_path)
                    .with_message(message)
            }
            TracyError::InvalidDigest { value, .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_digest(value)
                .with_message(message),
            TracyError::InvalidVersion { .. } | TracyError::VersionOverflow { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            TracyError::Config { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("config")
                .with_message(message),
            TracyError::Io { op, path, .. } => ExError::new(ExErrorKind::Io)
                .with_op(op)
                .with_tracked_path(path)
                .with_message(message),
            TracyError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::MissingBlob)
            .with_op("restore")
            .with_digest("abcd");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_MISSING_BLOB]"));
        assert!(rendered.contains("restore"));
        assert!(rendered.contains("abcd"));
    }

    #[test]
    fn test_io_helper_keeps_op_and_path() {
        let err = TracyError::io(
            "read_source",
            "/tmp/x.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        match &err {
            TracyError::Io { op, path, .. } => {
                assert_eq!(op, "read_source");
                assert_eq!(path, &PathBuf::from("/tmp/x.txt"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ExError::from(err).kind(), ExErrorKind::Io);
    }

    #[test]
    fn test_only_metadata_failure_reports_file_restored() {
        let partial = TracyError::RestoreMetadataFailed {
            tracked_path: PathBuf::from("/tmp/a"),
            message: "disk full".to_string(),
        };
        let missing = TracyError::MissingBlob {
            digest: "ab".to_string(),
        };
        assert!(partial.file_was_restored());
        assert!(!missing.file_was_restored());
    }
}
