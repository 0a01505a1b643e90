//! Tracy Store - durable state on the local filesystem
//!
//! Provides:
//! - `TracyConfig`: the explicit home/objects/registry locations
//! - Content-addressable storage (CAS) for file snapshots
//! - `RegistryStore` and its file implementation `RegistryFile`: whole-file
//!   JSON persistence of the project registry

pub mod cas;
pub mod config;
pub mod errors;
pub mod registry_file;

// Re-export key types
pub use cas::FsStore;
pub use config::TracyConfig;
pub use errors::Result;
pub use registry_file::{RegistryFile, RegistryStore};
