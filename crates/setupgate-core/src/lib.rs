//! # setupgate-core
//!
//! The routing and setup-gate engine - THE LOGIC.
//!
//! This crate holds everything about a navigation that can be decided
//! without touching the network:
//! - `routes` → immutable route tables and path matching
//! - `status` → the remote setup-status payload and fetch outcomes
//! - `guard` → the setup-gate decision function
//! - `navigation` → attempts, guard scope and navigation outcomes
//! - `presets` → the shipped route layouts
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - The guard decides; fetching the status and committing a navigation
//!   belong to the app layer
//! - Guard evaluation is total: every status outcome maps to a decision

// =============================================================================
// MODULES
// =============================================================================

pub mod guard;
pub mod navigation;
pub mod presets;
pub mod primitives;
pub mod routes;
pub mod status;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{GateError, RouteName, RouteParams, ViewRef};

// =============================================================================
// RE-EXPORTS: Routing
// =============================================================================

pub use navigation::{
    AbortReason, GuardScope, NavigationAttempt, NavigationOutcome, Resolution,
};
pub use presets::Layout;
pub use routes::{PathPattern, RouteMatch, RouteRecord, RouteSpec, RouteTable};

// =============================================================================
// RE-EXPORTS: Gate
// =============================================================================

pub use guard::{
    Decision, GateCheck, GateState, RedirectReason, SetupGate, SetupStep, UnknownStepPolicy,
    Verdict,
};
pub use status::{FetchFailure, SetupStatus, StatusEnvelope, StatusMessage, StatusOutcome};
