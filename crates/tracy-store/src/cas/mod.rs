//! Content-Addressable Storage (CAS)
//!
//! Provides:
//! - Filesystem-based CAS with atomic, streaming writes
//! - Flat layout: one blob per digest directly under the objects directory
//! - Verified restore of a blob onto a working file

pub(crate) mod atomic;
mod fs_store;

pub use fs_store::{compute_digest, validate_digest, validate_hex_prefix, FsStore, DIGEST_HEX_LEN};
