//! # API Request/Response Types
//!
//! This module defines the JSON structures for the gate server.

use serde::{Deserialize, Serialize};
use setupgate_core::{Resolution, RouteParams, RouteSpec, SetupStep};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ROUTES RESPONSE
// =============================================================================

/// Route table listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteSpec>,
    /// Setup steps in wizard order; empty when no gate is configured.
    pub steps: Vec<SetupStep>,
    /// Routes reachable without a status fetch.
    pub allow_list: Vec<String>,
    pub scope: String,
}

// =============================================================================
// NAVIGATE
// =============================================================================

/// Query string for `GET /navigate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateQuery {
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
}

/// Result of one guarded navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateResponse {
    pub navigation: Resolution,
    /// Path of the route the navigation landed on.
    pub location: String,
}

// =============================================================================
// PAGE RESPONSE
// =============================================================================

/// Body returned when a path is allowed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub route: String,
    pub view: String,
    pub params: RouteParams,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
