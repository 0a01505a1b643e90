pub mod entry;
pub mod project;
pub mod version;

pub use entry::{short_hash, VersionCandidate, VersionEntry, SHORT_HASH_LEN};
pub use project::{LastUsed, Project};
pub use version::{bump, BumpLevel, VersionNumber};
