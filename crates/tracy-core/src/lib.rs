//! Tracy Core - version metadata model and registry
//!
//! This crate provides the in-memory kernel of Tracy:
//! - `VersionNumber` and the deterministic `bump` rule
//! - `VersionEntry` / `Project` records
//! - `ProjectRegistry`, which owns the per-path latest/current invariants
//! - The error taxonomy (`TracyError`) and canonical error facility (`ExError`)
//! - The structured logging facility shared by every Tracy crate
//!
//! Nothing here touches the filesystem; persistence and blob storage live
//! in `tracy-store`.

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod registry;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, TracyError};
pub use model::{
    bump, short_hash, BumpLevel, LastUsed, Project, VersionCandidate, VersionEntry, VersionNumber,
};
pub use registry::ProjectRegistry;
