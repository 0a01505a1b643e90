//! Error handling for tracy-store
//!
//! Wraps tracy-core `TracyError` with store-specific helpers

use std::path::Path;

use tracy_core::errors::TracyError;

/// Result type alias using TracyError
pub type Result<T> = std::result::Result<T, TracyError>;

/// Create an IO error tagged with the failing operation and path
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> TracyError {
    TracyError::io(operation, path, err)
}

/// Create a CAS missing blob error for a lookup
pub fn cas_missing(digest: &str) -> TracyError {
    TracyError::BlobNotFound {
        digest: digest.to_string(),
    }
}

/// Create an invalid digest error
pub fn invalid_digest(value: &str, reason: &str) -> TracyError {
    TracyError::InvalidDigest {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
