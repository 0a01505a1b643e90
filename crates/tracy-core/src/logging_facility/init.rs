//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at startup; later calls are no-ops. `RUST_LOG` overrides the
/// profile's default filter. Output goes to stderr so command output on
/// stdout stays clean.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Capture mode for test assertions
///
/// # Example
///
/// ```
/// use tracy_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    init_with_filter(profile, profile.default_filter());
}

/// Initialize with an explicit default filter such as `tracy=info`
///
/// `RUST_LOG` still takes precedence. Only the first initialization in a
/// process has any effect.
pub fn init_with_filter(profile: Profile, default_filter: &str) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter)
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter)
                    .init();
            }
            Profile::Test => {
                // Test capture is initialized separately via init_test_capture()
                tracing_subscriber::registry().init();
            }
        }
    });
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "tracy=debug",
            Profile::Production | Profile::Test => "tracy=info",
        }
    }
}

/// Default filter for a CLI verbosity count (`-v` flags)
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "off",
        1 => "tracy=info",
        _ => "tracy=debug",
    }
}

/// Parse a profile name as used by the CLI's `--log-format`
///
/// `json` selects `Production`; anything else selects `Development`.
pub fn profile_from_format(format: &str) -> Profile {
    match format.to_ascii_lowercase().as_str() {
        "json" => Profile::Production,
        _ => Profile::Development,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        // Multiple calls should not panic
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn test_profile_from_format() {
        assert_eq!(profile_from_format("json"), Profile::Production);
        assert_eq!(profile_from_format("JSON"), Profile::Production);
        assert_eq!(profile_from_format("pretty"), Profile::Development);
    }

    #[test]
    fn test_filter_for_verbosity() {
        assert_eq!(filter_for_verbosity(0), "off");
        assert_eq!(filter_for_verbosity(1), "tracy=info");
        assert_eq!(filter_for_verbosity(5), "tracy=debug");
    }
}
