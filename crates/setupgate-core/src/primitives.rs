//! # Primitives
//!
//! Hardcoded runtime constants for the setup gate.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! The app layer may override the defaults through configuration.

/// Default status fetch timeout in milliseconds.
///
/// Expiry is treated exactly like a transport failure.
pub const DEFAULT_STATUS_TIMEOUT_MS: u64 = 5_000;

/// Default URL of the remote setup-status endpoint (versioned API).
///
/// The first, unversioned API served the same payload at `/config/setup`;
/// point `status_url` there for older backends.
pub const DEFAULT_STATUS_URL: &str = "http://127.0.0.1:9090/v1/config/setup";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for route names.
pub const MAX_ROUTE_NAME_LENGTH: usize = 64;

/// Maximum number of segments in a path pattern.
///
/// Deeper patterns are rejected at registration. Matching a request splits
/// at most one segment past the pattern's own depth.
pub const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum number of route records in one table.
pub const MAX_ROUTES: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_url_uses_versioned_path() {
        assert!(DEFAULT_STATUS_URL.ends_with("/v1/config/setup"));
    }

    #[test]
    fn default_timeout_is_positive() {
        assert!(DEFAULT_STATUS_TIMEOUT_MS > 0);
    }
}
