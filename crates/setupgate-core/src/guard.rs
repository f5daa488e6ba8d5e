//! # Setup Gate
//!
//! The decision half of the navigation guard.
//!
//! The gate never performs I/O. Evaluation is split in two phases so the
//! caller only fetches status when it has to:
//!
//! 1. [`SetupGate::check`] looks at the target alone. Allow-listed targets
//!    settle immediately; everything else needs a status.
//! 2. [`SetupGate::resolve`] maps a [`StatusOutcome`] to a verdict.
//!
//! ## State Machine
//!
//! ```text
//! check ─┬─ AllowListed ────────────────────────────► Allow
//!        └─ NeedsStatus ─┬─ FetchFailed ────────────► Redirect(first step)
//!                        ├─ NoPayload ──────────────► Redirect(first step)
//!                        ├─ PayloadNamesStep ───────► Redirect(named step)
//!                        ├─ PayloadComplete ────────► Allow
//!                        └─ PayloadUnrecognized ─┬──► Allow            (permissive)
//!                                                └──► Redirect(first)  (strict)
//! ```
//!
//! The fetch between the two phases belongs to the caller, so every
//! [`GateState`] is terminal.

use crate::routes::RouteTable;
use crate::status::StatusOutcome;
use crate::{GateError, RouteName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// SETUP FLOW
// =============================================================================

/// One step of the setup wizard.
///
/// `value` is what the status endpoint reports; `route` is where the user is
/// sent. They differ in the single-page setup layout, where the step value
/// `start` is served by the route `Setup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupStep {
    pub value: String,
    pub route: RouteName,
}

impl SetupStep {
    /// Create a step whose value and route name differ.
    pub fn new(value: &str, route: &str) -> Result<Self, GateError> {
        if value.trim().is_empty() {
            return Err(GateError::ConfigError(
                "setup step value must not be empty".to_string(),
            ));
        }
        Ok(Self {
            value: value.to_string(),
            route: RouteName::new(route)?,
        })
    }

    /// Create a step served by a route of the same name.
    pub fn same(name: &str) -> Result<Self, GateError> {
        Self::new(name, name)
    }
}

/// How a status value that is neither a step nor a completion marker is
/// treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownStepPolicy {
    /// Let the navigation through.
    #[default]
    Permissive,
    /// Send the user to the first setup step.
    Strict,
}

// =============================================================================
// DECISIONS
// =============================================================================

/// Terminal state of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    AllowListed,
    FetchFailed,
    NoPayload,
    PayloadNamesStep,
    PayloadComplete,
    PayloadUnrecognized,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateState::AllowListed => "allow_listed",
            GateState::FetchFailed => "fetch_failed",
            GateState::NoPayload => "no_payload",
            GateState::PayloadNamesStep => "payload_names_step",
            GateState::PayloadComplete => "payload_complete",
            GateState::PayloadUnrecognized => "payload_unrecognized",
        };
        f.write_str(name)
    }
}

/// Why the gate redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// The status could not be fetched.
    FetchFailed,
    /// The status carried no usable value.
    NoPayload,
    /// The status names a setup step.
    NamedStep,
    /// The status value is unrecognized and the policy is strict.
    UnrecognizedStep,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RedirectReason::FetchFailed => "fetch_failed",
            RedirectReason::NoPayload => "no_payload",
            RedirectReason::NamedStep => "named_step",
            RedirectReason::UnrecognizedStep => "unrecognized_step",
        };
        f.write_str(name)
    }
}

/// The guard's continuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    /// Proceed to the requested route unchanged.
    Allow,
    /// Proceed to another route instead.
    Redirect { to: RouteName, reason: RedirectReason },
}

impl Decision {
    /// Whether the decision lets the requested navigation through.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Redirect target, if any.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&RouteName> {
        match self {
            Decision::Allow => None,
            Decision::Redirect { to, .. } => Some(to),
        }
    }
}

/// A terminal state paired with the decision it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub state: GateState,
    pub decision: Decision,
}

/// Result of the first evaluation phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateCheck {
    /// Decided without a status fetch.
    Settled(Verdict),
    /// A status fetch is required; feed it to [`SetupGate::resolve`].
    NeedsStatus,
}

// =============================================================================
// SETUP GATE
// =============================================================================

/// The setup-gate decision function and its configuration.
///
/// Construction enforces the loop-freedom invariant: every step's route is
/// allow-listed. A gate that would redirect into a route it then redirects
/// away from cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupGate {
    first: SetupStep,
    steps: Vec<SetupStep>,
    allow: BTreeSet<RouteName>,
    completion: BTreeSet<String>,
    policy: UnknownStepPolicy,
}

impl SetupGate {
    /// Create a gate whose allow-list is exactly the step routes.
    pub fn new(steps: Vec<SetupStep>) -> Result<Self, GateError> {
        let allow = steps.iter().map(|s| s.route.clone()).collect();
        Self::with_allow_list(steps, allow)
    }

    /// Create a gate with an explicit allow-list.
    ///
    /// Fails with `AllowListMissingStep` if any step route is absent.
    pub fn with_allow_list(
        steps: Vec<SetupStep>,
        allow: BTreeSet<RouteName>,
    ) -> Result<Self, GateError> {
        let Some(first) = steps.first().cloned() else {
            return Err(GateError::EmptySetupFlow);
        };
        if let Some(step) = steps.iter().find(|s| !allow.contains(&s.route)) {
            return Err(GateError::AllowListMissingStep(step.route.clone()));
        }
        Ok(Self {
            first,
            steps,
            allow,
            completion: BTreeSet::new(),
            policy: UnknownStepPolicy::default(),
        })
    }

    /// Register status values meaning "setup complete".
    #[must_use]
    pub fn with_completion_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completion.extend(values.into_iter().map(Into::into));
        self
    }

    /// Set the policy for unrecognized status values.
    #[must_use]
    pub fn with_policy(mut self, policy: UnknownStepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check every step route against a route table.
    pub fn validate_against(&self, table: &RouteTable) -> Result<(), GateError> {
        for step in &self.steps {
            if !table.contains(&step.route) {
                return Err(GateError::StepRouteMissing {
                    step: step.value.clone(),
                    route: step.route.clone(),
                });
            }
        }
        Ok(())
    }

    /// Steps in wizard order.
    #[must_use]
    pub fn steps(&self) -> &[SetupStep] {
        &self.steps
    }

    /// The canonical first step.
    #[must_use]
    pub fn first_step(&self) -> &SetupStep {
        &self.first
    }

    /// Route names reachable without consulting the status.
    #[must_use]
    pub fn allow_list(&self) -> &BTreeSet<RouteName> {
        &self.allow
    }

    /// Values treated as "setup complete".
    #[must_use]
    pub fn completion_values(&self) -> &BTreeSet<String> {
        &self.completion
    }

    /// Policy for unrecognized status values.
    #[must_use]
    pub fn policy(&self) -> UnknownStepPolicy {
        self.policy
    }

    /// Whether reaching `target` requires a status fetch.
    #[must_use]
    pub fn requires_status(&self, target: &RouteName) -> bool {
        !self.allow.contains(target)
    }

    /// First phase: settle allow-listed targets.
    #[must_use]
    pub fn check(&self, target: &RouteName) -> GateCheck {
        if self.requires_status(target) {
            GateCheck::NeedsStatus
        } else {
            GateCheck::Settled(Verdict {
                state: GateState::AllowListed,
                decision: Decision::Allow,
            })
        }
    }

    /// Second phase: map a status outcome to a verdict.
    #[must_use]
    pub fn resolve(&self, outcome: &StatusOutcome) -> Verdict {
        match outcome {
            StatusOutcome::Failed(_) => {
                self.to_first(GateState::FetchFailed, RedirectReason::FetchFailed)
            }
            StatusOutcome::Missing => {
                self.to_first(GateState::NoPayload, RedirectReason::NoPayload)
            }
            StatusOutcome::Ready(status) => {
                if let Some(step) = self.step_for(&status.config_val) {
                    return Verdict {
                        state: GateState::PayloadNamesStep,
                        decision: Decision::Redirect {
                            to: step.route.clone(),
                            reason: RedirectReason::NamedStep,
                        },
                    };
                }
                if self.completion.contains(&status.config_val) {
                    return Verdict {
                        state: GateState::PayloadComplete,
                        decision: Decision::Allow,
                    };
                }
                match self.policy {
                    UnknownStepPolicy::Permissive => Verdict {
                        state: GateState::PayloadUnrecognized,
                        decision: Decision::Allow,
                    },
                    UnknownStepPolicy::Strict => self.to_first(
                        GateState::PayloadUnrecognized,
                        RedirectReason::UnrecognizedStep,
                    ),
                }
            }
        }
    }

    /// Both phases at once, for callers that already hold an outcome.
    ///
    /// The outcome is ignored for allow-listed targets.
    #[must_use]
    pub fn evaluate(&self, target: &RouteName, outcome: &StatusOutcome) -> Verdict {
        match self.check(target) {
            GateCheck::Settled(verdict) => verdict,
            GateCheck::NeedsStatus => self.resolve(outcome),
        }
    }

    /// Shorthand for `evaluate(..).decision`.
    #[must_use]
    pub fn decide(&self, target: &RouteName, outcome: &StatusOutcome) -> Decision {
        self.evaluate(target, outcome).decision
    }

    fn step_for(&self, value: &str) -> Option<&SetupStep> {
        self.steps.iter().find(|s| s.value == value)
    }

    fn to_first(&self, state: GateState, reason: RedirectReason) -> Verdict {
        Verdict {
            state,
            decision: Decision::Redirect {
                to: self.first_step().route.clone(),
                reason,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
