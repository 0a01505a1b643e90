//! Filesystem-based Content-Addressable Storage
//!
//! One immutable file per blob, named by the lowercase hex SHA-256 of its
//! content, directly under the store root. Writes stream through a temp
//! file and are renamed into place, so a blob is either complete or absent.

use crate::cas::atomic::{parent_dir, persist, stream_to_temp, CHUNK_SIZE};
use crate::errors::{cas_missing, invalid_digest, io_error, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracy_core::errors::TracyError;

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Name hint of the temp files incoming blobs are streamed into
const INCOMING_HINT: &str = "incoming";

/// Name hint of the temp files restored content is staged in
const RESTORE_HINT: &str = "tracy-restore";

/// Filesystem-based CAS store
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a new CAS store at the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory holding the blobs
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a blob with this digest is stored at
    ///
    /// # Errors
    ///
    /// Returns `InvalidDigest` unless `digest` is 64 lowercase hex chars.
    pub fn blob_path(&self, digest: &str) -> Result<PathBuf> {
        validate_digest(digest)?;
        Ok(self.root.join(digest))
    }

    /// Write content to CAS and return the digest
    ///
    /// - Computes SHA256 digest
    /// - Writes atomically using temp→rename
    /// - Idempotent: writing same content twice stores one blob
    pub fn put(&self, content: &[u8]) -> Result<String> {
        self.put_reader(content)
    }

    /// Store everything `reader` yields, streaming in bounded chunks
    pub fn put_reader<R: Read>(&self, reader: R) -> Result<String> {
        let (temp, digest) = stream_to_temp(reader, &self.root, INCOMING_HINT)?;
        let target = self.root.join(&digest);

        if target.exists() {
            temp.close()
                .map_err(|e| io_error("remove_temp", &self.root, e))?;
            tracing::debug!(digest = %digest, "Blob already stored");
            return Ok(digest);
        }

        persist(temp, &target)?;
        mark_read_only(&target)?;

        tracing::debug!(digest = %digest, path = %target.display(), "Stored blob");
        Ok(digest)
    }

    /// Store the content of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if `path` does not exist, `Io` otherwise.
    pub fn put_file(&self, path: &Path) -> Result<String> {
        let file = open_source(path)?;
        self.put_reader(file)
    }

    /// Compute the digest of a file without storing it
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if `path` does not exist, `Io` otherwise.
    pub fn digest_file(&self, path: &Path) -> Result<String> {
        let file = open_source(path)?;
        digest_reader(file, path)
    }

    /// Read content from CAS by digest
    ///
    /// # Errors
    ///
    /// Returns `BlobNotFound` if no blob is stored under `digest`.
    pub fn get(&self, digest: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(digest)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => cas_missing(digest),
            _ => io_error("read_cas", &path, e),
        })
    }

    /// Check whether a blob exists without reading it
    ///
    /// Malformed digests are never contained.
    pub fn contains(&self, digest: &str) -> bool {
        self.blob_path(digest)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Copy a blob over `target`, verifying its content on the way out
    ///
    /// The blob is streamed into a fresh temp file next to `target` and
    /// renamed into place; an existing target keeps its permissions. Nothing
    /// in the target's directory is touched unless the blob exists and
    /// hashes to `digest`.
    ///
    /// # Errors
    ///
    /// - `MissingBlob` if no blob is stored under `digest`
    /// - `CorruptBlob` if the stored bytes hash to something else
    /// - `Io` on any filesystem failure
    pub fn restore_to(&self, digest: &str, target: &Path) -> Result<u64> {
        let blob_path = self.blob_path(digest)?;
        let blob = File::open(&blob_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TracyError::MissingBlob {
                digest: digest.to_string(),
            },
            _ => io_error("open_blob", &blob_path, e),
        })?;
        let size = blob
            .metadata()
            .map_err(|e| io_error("stat_blob", &blob_path, e))?
            .len();

        let (temp, actual) = stream_to_temp(blob, &parent_dir(target), RESTORE_HINT)?;
        if actual != digest {
            return Err(TracyError::CorruptBlob {
                digest: digest.to_string(),
                actual,
            });
        }

        match fs::metadata(target) {
            Ok(existing) => temp
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| io_error("copy_permissions", temp.path(), e))?,
            Err(_) => set_new_file_permissions(&temp)?,
        }
        persist(temp, target)?;

        tracing::debug!(digest = %digest, target = %target.display(), size_bytes = size, "Restored blob");
        Ok(size)
    }
}

/// Compute the hex SHA-256 of a byte slice
pub fn compute_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Check that `value` is a full digest: 64 lowercase hex characters
pub fn validate_digest(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(invalid_digest(value, "expected 64 hex characters"));
    }
    validate_hex_prefix(value)
}

/// Check that `value` is a non-empty lowercase hex string
pub fn validate_hex_prefix(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid_digest(value, "empty"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    {
        return Err(invalid_digest(value, "expected lowercase hex characters"));
    }
    Ok(())
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TracyError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => io_error("open_source", path, e),
    })
}

fn digest_reader<R: Read>(mut reader: R, path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error("read_source", path, e)),
        }
    }
    Ok(hex::encode(hasher.finalize()))
}

// Temp files are created owner-only; a recreated file gets ordinary
// permissions instead.
#[cfg(unix)]
fn set_new_file_permissions(temp: &NamedTempFile) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(0o644))
        .map_err(|e| io_error("set_permissions", temp.path(), e))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_temp: &NamedTempFile) -> Result<()> {
    Ok(())
}

fn mark_read_only(path: &Path) -> Result<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| io_error("stat_blob", path, e))?
        .permissions();
    permissions.set_readonly(true);
    fs::set_permissions(path, permissions).map_err(|e| io_error("seal_blob", path, e))
}
