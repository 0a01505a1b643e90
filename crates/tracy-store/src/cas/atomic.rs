//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes. Temp files are
//! created next to their target with a random name, so the rename never
//! crosses filesystems and never clobbers a file someone else owns.

use crate::errors::{io_error, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Size of the buffer used when streaming content
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Directory a temp file for `target` has to live in
pub fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Create a uniquely named, hidden temp file in `dir`
///
/// The name is `.<hint>.<random>.tmp`; the file is removed when dropped
/// unless it is persisted first.
pub fn temp_file_in(dir: &Path, hint: &str) -> Result<NamedTempFile> {
    fs::create_dir_all(dir).map_err(|e| io_error("create_dir", dir, e))?;
    tempfile::Builder::new()
        .prefix(&format!(".{}.", hint))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| io_error("create_temp", dir, e))
}

/// Atomically write bytes to a file
///
/// Uses temp file + rename to ensure atomic write
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let mut temp = temp_file_in(&parent_dir(target_path), &file_name_hint(target_path))?;

    temp.write_all(content)
        .map_err(|e| io_error("write_temp", temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| io_error("sync_temp", temp.path(), e))?;

    persist(temp, target_path)
}

/// Stream `reader` into a new temp file in `dir`, hashing as it goes
///
/// Returns the temp file together with the hex SHA-256 of everything read.
/// On failure the temp file is dropped, which removes it.
pub fn stream_to_temp<R: Read>(reader: R, dir: &Path, hint: &str) -> Result<(NamedTempFile, String)> {
    let mut temp = temp_file_in(dir, hint)?;
    let digest = write_hashed(reader, &mut temp)?;
    Ok((temp, digest))
}

fn write_hashed<R: Read>(mut reader: R, temp: &mut NamedTempFile) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error("read_source", temp.path(), e)),
        };
        hasher.update(&buf[..n]);
        temp.write_all(&buf[..n])
            .map_err(|e| io_error("write_temp", temp.path(), e))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| io_error("sync_temp", temp.path(), e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Rename a finished temp file over its target
///
/// If the rename fails the temp file is removed.
pub fn persist(temp: NamedTempFile, target_path: &Path) -> Result<()> {
    temp.persist(target_path)
        .map(|_| ())
        .map_err(|e| io_error("rename_temp", target_path, e.error))
}

fn file_name_hint(target: &Path) -> String {
    target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tracy".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_names(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.txt");

        atomic_write(&target, b"hello").unwrap();

        let content = fs::read(&target).unwrap();
        assert_eq!(content, b"hello");
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("subdir").join("test.txt");

        atomic_write(&target, b"nested").unwrap();

        let content = fs::read(&target).unwrap();
        assert_eq!(content, b"nested");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.txt");
        fs::write(&target, b"old").unwrap();

        atomic_write(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.txt");

        atomic_write(&target, b"clean").unwrap();

        assert!(tmp_names(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_write_leaves_similarly_named_files_alone() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.txt");
        let neighbour = temp_dir.path().join(".test.txt.tmp");
        fs::write(&neighbour, b"user data").unwrap();

        atomic_write(&target, b"first").unwrap();
        atomic_write(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert_eq!(fs::read(&neighbour).unwrap(), b"user data");
        assert_eq!(tmp_names(temp_dir.path()), vec![".test.txt.tmp".to_string()]);
    }

    #[test]
    fn test_temp_files_are_hidden_and_unique() {
        let temp_dir = TempDir::new().unwrap();

        let a = temp_file_in(temp_dir.path(), "notes.md").unwrap();
        let b = temp_file_in(temp_dir.path(), "notes.md").unwrap();

        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".notes.md."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_dropped_temp_file_is_removed() {
        let temp_dir = TempDir::new().unwrap();

        let (temp, _) = stream_to_temp(&b"abandoned"[..], temp_dir.path(), "x").unwrap();
        drop(temp);

        assert!(tmp_names(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_stream_to_temp_hashes_across_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let content = vec![7u8; CHUNK_SIZE * 2 + 13];

        let (temp, digest) = stream_to_temp(&content[..], temp_dir.path(), "incoming").unwrap();

        let expected = hex::encode(Sha256::digest(&content));
        assert_eq!(digest, expected);
        assert_eq!(fs::read(temp.path()).unwrap(), content);
    }

    #[test]
    fn test_parent_dir_of_bare_name_is_cwd() {
        assert_eq!(parent_dir(Path::new("a.txt")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/data/a.txt")), PathBuf::from("/data"));
    }
}
