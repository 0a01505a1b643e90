//! Tracy Engine - Orchestration layer
//!
//! Coordinates the in-memory registry (`tracy-core`) with the blob store and
//! registry file (`tracy-store`):
//! - `SnapshotService::create_snapshot`: hash → store → append metadata
//! - `SnapshotService::restore`: resolve hash → copy out → mark current
//! - Lookups used by the CLI (projects, tracked files, history, last used)
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for every operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod resolve;
pub mod search;
pub mod service;

pub use resolve::{resolve_restore_target, RestoreScope};
pub use search::search_file_name;
pub use service::{ProjectInit, RestoredVersion, SnapshotService};
