//! Behaviour of the gate for each shipped layout, driven through the public
//! API only.

use setupgate_core::{
    Decision, FetchFailure, GateState, GuardScope, Layout, RedirectReason, RouteName,
    SetupStatus, StatusEnvelope, StatusOutcome, UnknownStepPolicy,
};

fn name(s: &str) -> RouteName {
    RouteName::new(s).expect("valid")
}

fn from_body(body: &[u8]) -> StatusOutcome {
    StatusOutcome::from_result(
        StatusEnvelope::decode(body).map_err(|e| FetchFailure::Malformed(e.to_string())),
    )
}

// =============================================================================
// WIZARD LAYOUT
// =============================================================================

#[test]
fn wizard_site_status_redirects_to_site() {
    let gate = Layout::Wizard.gate().expect("gate").expect("present");
    let outcome = StatusOutcome::from_envelope(&StatusEnvelope::with_value("site"));
    assert_eq!(
        gate.decide(&name("Root"), &outcome),
        Decision::Redirect {
            to: name("site"),
            reason: RedirectReason::NamedStep,
        }
    );
}

#[test]
fn wizard_undefined_value_redirects_to_start() {
    let gate = Layout::Wizard.gate().expect("gate").expect("present");
    let outcome = from_body(br#"{"code":200,"message":{"config_key":"setup"}}"#);
    let verdict = gate.evaluate(&name("Root"), &outcome);
    assert_eq!(verdict.state, GateState::NoPayload);
    assert_eq!(verdict.decision.redirect_target(), Some(&name("start")));
}

#[test]
fn wizard_rejected_fetch_redirects_to_start() {
    let gate = Layout::Wizard.gate().expect("gate").expect("present");
    let outcome = StatusOutcome::Failed(FetchFailure::Transport("connection refused".into()));
    assert_eq!(
        gate.decide(&name("Root"), &outcome),
        Decision::Redirect {
            to: name("start"),
            reason: RedirectReason::FetchFailed,
        }
    );
}

#[test]
fn wizard_step_values_match_exactly() {
    let outcome = from_body(br#"{"code":200,"message":{"config_val":" start"}}"#);

    let permissive = Layout::Wizard.gate().expect("gate").expect("present");
    let verdict = permissive.evaluate(&name("Root"), &outcome);
    assert_eq!(verdict.state, GateState::PayloadUnrecognized);
    assert!(verdict.decision.is_allow());

    let strict = permissive.with_policy(UnknownStepPolicy::Strict);
    assert_eq!(
        strict.decide(&name("Root"), &outcome),
        Decision::Redirect {
            to: name("start"),
            reason: RedirectReason::UnrecognizedStep,
        }
    );
}

#[test]
fn wizard_complete_allows_root() {
    let gate = Layout::Wizard.gate().expect("gate").expect("present");
    let outcome = StatusOutcome::Ready(SetupStatus::new("Root"));
    assert_eq!(gate.decide(&name("Root"), &outcome), Decision::Allow);
}

#[test]
fn wizard_steps_are_reachable_during_setup() {
    let gate = Layout::Wizard.gate().expect("gate").expect("present");
    let outcome = StatusOutcome::Ready(SetupStatus::new("start"));
    assert_eq!(gate.decide(&name("site"), &outcome), Decision::Allow);
    assert_eq!(gate.decide(&name("start"), &outcome), Decision::Allow);
}

// =============================================================================
// SETUP LAYOUT
// =============================================================================

#[test]
fn setup_start_value_redirects_to_setup_route() {
    let gate = Layout::Setup.gate().expect("gate").expect("present");
    let outcome = StatusOutcome::Ready(SetupStatus::new("start"));
    assert_eq!(
        gate.decide(&name("Root"), &outcome).redirect_target(),
        Some(&name("Setup"))
    );
}

#[test]
fn setup_other_value_allows_root() {
    let gate = Layout::Setup.gate().expect("gate").expect("present");
    let outcome = StatusOutcome::Ready(SetupStatus::new("done"));
    assert!(gate.decide(&name("Root"), &outcome).is_allow());
}

#[test]
fn setup_missing_payload_redirects_to_setup_route() {
    let gate = Layout::Setup.gate().expect("gate").expect("present");
    let outcome = from_body(br#"{"code":200,"message":null}"#);
    assert_eq!(
        gate.decide(&name("Root"), &outcome).redirect_target(),
        Some(&name("Setup"))
    );
}

// =============================================================================
// PAGES LAYOUT
// =============================================================================

#[test]
fn pages_layout_matches_page_paths() {
    let table = Layout::Pages.route_table().expect("table");
    let found = table.match_path("/pages/about").expect("match");
    assert_eq!(found.record.name, "Page");
    assert_eq!(found.params.get("id").map(String::as_str), Some("about"));
    assert!(!GuardScope::PerRoute.applies_to(found.record));
}

#[test]
fn guarded_root_in_setup_layouts() {
    for layout in [Layout::Setup, Layout::Wizard] {
        let table = layout.route_table().expect("table");
        assert!(table.require("Root").expect("root").guarded);
    }
}
