//! # Navigation Types
//!
//! Transient values describing one navigation and how it ended.
//!
//! A `NavigationAttempt` is created per request, consumed by the guard and
//! never stored. A `Resolution` is where the guard sends it: the requested
//! route, or one redirect into the setup flow. Redirect targets are always
//! allow-listed, so a resolution never needs a second hop.
//!
//! A `NavigationOutcome` is what a session navigation ends with: a
//! resolution that was committed, or an abort when a newer navigation won.

use crate::guard::RedirectReason;
use crate::routes::{RouteRecord, RouteTable};
use crate::{GateError, RouteName, RouteParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which routes the gate runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardScope {
    /// Before every navigation (global pre-navigation hook).
    #[default]
    Global,
    /// Only for routes marked `guarded` (per-route `beforeEnter`).
    PerRoute,
}

impl GuardScope {
    /// Whether the gate applies when entering `record`.
    #[must_use]
    pub fn applies_to(&self, record: &RouteRecord) -> bool {
        match self {
            GuardScope::Global => true,
            GuardScope::PerRoute => record.guarded,
        }
    }
}

/// One attempted navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAttempt {
    pub to: RouteName,
    pub from: Option<RouteName>,
    pub params: RouteParams,
}

impl NavigationAttempt {
    /// Attempt with no source and no params.
    #[must_use]
    pub fn new(to: RouteName) -> Self {
        Self {
            to,
            from: None,
            params: RouteParams::new(),
        }
    }

    /// Set the source route.
    #[must_use]
    pub fn from_route(mut self, from: Option<RouteName>) -> Self {
        self.from = from;
        self
    }

    /// Set captured path params.
    #[must_use]
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Where the guard sends one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// The requested route is entered unchanged.
    Committed { route: RouteName, params: RouteParams },
    /// The gate sends the user to a setup step instead.
    Redirected {
        requested: RouteName,
        route: RouteName,
        reason: RedirectReason,
    },
}

impl Resolution {
    /// The route the user ends up on.
    #[must_use]
    pub fn route(&self) -> &RouteName {
        match self {
            Resolution::Committed { route, .. } | Resolution::Redirected { route, .. } => route,
        }
    }

    /// Address-bar path of the landing route.
    pub fn location(&self, table: &RouteTable) -> Result<String, GateError> {
        match self {
            Resolution::Committed { route, params } => table.path_for(route, params),
            Resolution::Redirected { route, .. } => table.path_for(route, &RouteParams::new()),
        }
    }
}

// =============================================================================
// SESSION OUTCOME
// =============================================================================

/// Why a session navigation ended without committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// A newer navigation started before this one resolved.
    Superseded,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Superseded => f.write_str("superseded"),
        }
    }
}

/// Final result of one session navigation.
///
/// Serializes exactly like [`Resolution`] for the two landing variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// The requested route was entered unchanged.
    Committed { route: RouteName, params: RouteParams },
    /// The gate sent the user elsewhere.
    Redirected {
        requested: RouteName,
        route: RouteName,
        reason: RedirectReason,
    },
    /// Nothing was entered.
    Aborted { reason: AbortReason },
}

impl From<Resolution> for NavigationOutcome {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Committed { route, params } => Self::Committed { route, params },
            Resolution::Redirected {
                requested,
                route,
                reason,
            } => Self::Redirected {
                requested,
                route,
                reason,
            },
        }
    }
}

impl NavigationOutcome {
    /// Address-bar path of the route the user ends up on, if any.
    pub fn location(&self, table: &RouteTable) -> Result<Option<String>, GateError> {
        match self {
            NavigationOutcome::Committed { route, params } => {
                table.path_for(route, params).map(Some)
            }
            NavigationOutcome::Redirected { route, .. } => {
                table.path_for(route, &RouteParams::new()).map(Some)
            }
            NavigationOutcome::Aborted { .. } => Ok(None),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
