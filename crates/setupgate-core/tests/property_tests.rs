//! # Property-Based Tests
//!
//! Invariants of the setup gate checked with proptest.

use proptest::prelude::*;
use setupgate_core::{
    Decision, FetchFailure, GateCheck, Layout, RouteName, SetupGate, SetupStatus, SetupStep,
    StatusOutcome, UnknownStepPolicy,
};

fn wizard() -> SetupGate {
    Layout::Wizard
        .gate()
        .expect("gate builds")
        .expect("wizard has a gate")
}

fn outcome_strategy() -> impl Strategy<Value = StatusOutcome> {
    prop_oneof![
        Just(StatusOutcome::Missing),
        Just(StatusOutcome::Failed(FetchFailure::Timeout)),
        (400u16..600).prop_map(|c| StatusOutcome::Failed(FetchFailure::HttpStatus(c))),
        "[a-zA-Z]{1,12}".prop_map(|v| StatusOutcome::Ready(SetupStatus::new(v))),
        prop_oneof![Just("start"), Just("site"), Just("Root")]
            .prop_map(|v| StatusOutcome::Ready(SetupStatus::new(v))),
    ]
}

fn policy_strategy() -> impl Strategy<Value = UnknownStepPolicy> {
    prop_oneof![
        Just(UnknownStepPolicy::Permissive),
        Just(UnknownStepPolicy::Strict)
    ]
}

proptest! {
    /// Same status twice produces the same decision twice.
    #[test]
    fn decision_is_idempotent(
        target in "[a-zA-Z]{1,12}",
        outcome in outcome_strategy(),
        policy in policy_strategy(),
    ) {
        let gate = wizard().with_policy(policy);
        let target = RouteName::new(target).expect("valid");
        let first = gate.evaluate(&target, &outcome);
        let second = gate.evaluate(&target, &outcome);
        prop_assert_eq!(first, second);
    }

    /// Allow-listed targets settle without a status, whatever it would be.
    #[test]
    fn allow_listed_targets_never_need_status(outcome in outcome_strategy()) {
        let gate = wizard();
        for step in gate.steps() {
            let settled = matches!(gate.check(&step.route), GateCheck::Settled(_));
            prop_assert!(settled);
            prop_assert_eq!(gate.decide(&step.route, &outcome), Decision::Allow);
        }
    }

    /// Every redirect lands on an allow-listed route, so it cannot loop.
    #[test]
    fn redirects_always_land_on_allow_list(
        target in "[a-zA-Z]{1,12}",
        outcome in outcome_strategy(),
        policy in policy_strategy(),
    ) {
        let gate = wizard().with_policy(policy);
        let target = RouteName::new(target).expect("valid");
        let decision = gate.decide(&target, &outcome);
        if let Some(to) = decision.redirect_target() {
            prop_assert!(gate.allow_list().contains(to));
            prop_assert!(!gate.requires_status(to));
        }
    }

    /// Failures always send the user to the first step.
    #[test]
    fn failures_redirect_to_first_step(code in 0u16..1000, msg in ".{0,40}") {
        let gate = wizard();
        let root = RouteName::new("Root").expect("valid");
        for failure in [
            FetchFailure::HttpStatus(code),
            FetchFailure::Transport(msg.clone()),
            FetchFailure::Malformed(msg.clone()),
        ] {
            let decision = gate.decide(&root, &StatusOutcome::Failed(failure));
            prop_assert_eq!(decision.redirect_target(), Some(&gate.first_step().route));
        }
    }

    /// Any step value maps to its own route.
    #[test]
    fn step_values_route_to_their_step(index in 0usize..2) {
        let gate = SetupGate::new(vec![
            SetupStep::same("start").expect("step"),
            SetupStep::same("site").expect("step"),
        ]).expect("gate");
        let step = &gate.steps()[index];
        let root = RouteName::new("Root").expect("valid");
        let outcome = StatusOutcome::Ready(SetupStatus::new(step.value.clone()));
        let decision = gate.decide(&root, &outcome);
        prop_assert_eq!(decision.redirect_target(), Some(&step.route));
    }
}
