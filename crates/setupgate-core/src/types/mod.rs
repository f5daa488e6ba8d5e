//! # Core Type Definitions
//!
//! This module contains the small value types shared by every other module:
//! - Route identifiers (`RouteName`, `ViewRef`)
//! - Path parameters captured while matching (`RouteParams`)
//! - Error types (`GateError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Are plain owned values with no interior mutability

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::primitives::MAX_ROUTE_NAME_LENGTH;

// =============================================================================
// ROUTE IDENTIFIERS
// =============================================================================

/// Name of a registered route (`"Root"`, `"Setup"`, `"site"`).
///
/// Route names are the currency of navigation: attempts, allow-lists and
/// redirects all refer to routes by name, never by path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteName(String);

impl RouteName {
    /// Create a route name, rejecting empty or oversized identifiers.
    pub fn new(name: impl Into<String>) -> Result<Self, GateError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GateError::InvalidRouteName(name));
        }
        if name.len() > MAX_ROUTE_NAME_LENGTH {
            return Err(GateError::InvalidRouteName(name));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RouteName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RouteName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque reference to the display unit a route renders.
///
/// The gate never interprets it; it is handed back to the caller when a
/// navigation commits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewRef(pub String);

impl ViewRef {
    /// Create a new view reference.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the view reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameters captured from `:name` path segments.
pub type RouteParams = BTreeMap<String, String>;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building or consulting the routing layer.
///
/// - Guard evaluation itself never fails: every status outcome maps to a
///   decision. These errors describe structural problems only.
/// - The CORE should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum GateError {
    /// A route name is empty or too long.
    #[error("Invalid route name: {0:?}")]
    InvalidRouteName(String),

    /// A path pattern could not be parsed.
    #[error("Invalid path pattern {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// No route with this name is registered.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// No registered route matches this path.
    #[error("No route matches path: {0}")]
    NoMatchingPath(String),

    /// Two records share the same name.
    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(RouteName),

    /// Two records share the same path pattern.
    #[error("Duplicate route path: {0}")]
    DuplicateRoutePath(String),

    /// A path cannot be built because a parameter value is missing.
    #[error("Missing path parameter {param:?} for route {route}")]
    MissingParam { route: RouteName, param: String },

    /// The setup flow declares no steps.
    #[error("Setup flow has no steps")]
    EmptySetupFlow,

    /// A setup step routes to a name the route table does not know.
    #[error("Setup step {step:?} routes to unregistered route {route}")]
    StepRouteMissing { step: String, route: RouteName },

    /// A setup step's route is not allow-listed, so the guard would loop.
    #[error("Allow-list is missing setup step route {0}")]
    AllowListMissingStep(RouteName),

    /// A route's path is taken by a gate server endpoint.
    #[error("Route path {0:?} is reserved by the gate server")]
    ReservedPath(String),

    /// A configuration value is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_name_rejects_blank() {
        assert!(RouteName::new("").is_err());
        assert!(RouteName::new("   ").is_err());
    }

    #[test]
    fn route_name_rejects_oversized() {
        let long = "r".repeat(MAX_ROUTE_NAME_LENGTH + 1);
        assert!(matches!(
            RouteName::new(long),
            Err(GateError::InvalidRouteName(_))
        ));
    }

    #[test]
    fn route_name_compares_with_str() {
        let name = RouteName::new("Root").expect("valid");
        assert_eq!(name, "Root");
        assert_eq!(name.to_string(), "Root");
    }

    #[test]
    fn route_name_serializes_transparently() {
        let name = RouteName::new("site").expect("valid");
        let json = serde_json::to_string(&name).expect("serialize");
        assert_eq!(json, "\"site\"");
    }
}
