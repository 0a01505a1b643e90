//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_PROJECT: &str = "project";
pub const FIELD_TRACKED_PATH: &str = "tracked_path";
pub const FIELD_DIGEST: &str = "digest";
pub const FIELD_VERSION: &str = "version";

// Collection sizes
pub const FIELD_MATCH_COUNT: &str = "match_count";
pub const FIELD_SIZE_BYTES: &str = "size_bytes";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
