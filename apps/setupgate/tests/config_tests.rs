//! Integration tests for loading gate configuration from TOML files.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use setupgate::config::GateConfig;
use setupgate_core::{GateError, GuardScope, Layout, RouteName, SetupStatus, StatusOutcome};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn name(s: &str) -> RouteName {
    RouteName::new(s).unwrap()
}

#[test]
fn test_load_setup_layout() {
    let file = write_config(
        r#"
status_url = "http://status.internal/v1/config/setup"
timeout_ms = 1500
layout = "setup"
"#,
    );

    let config = GateConfig::load(file.path()).unwrap();
    assert_eq!(config.status_url(), "http://status.internal/v1/config/setup");
    assert_eq!(config.timeout().unwrap(), Duration::from_millis(1500));

    let routing = config.build().unwrap();
    assert_eq!(routing.layout, Layout::Setup);
    let gate = routing.gate.unwrap();
    assert_eq!(gate.first_step().route, name("Setup"));
    assert!(gate.allow_list().contains(&name("Setup")));
}

#[test]
fn test_explicit_routes_and_steps_replace_preset() {
    let file = write_config(
        r#"
layout = "pages"
complete = ["done"]

[[routes]]
name = "Welcome"
path = "/welcome"
view = "WelcomeView"

[[routes]]
name = "Admin"
path = "/admin"
view = "AdminView"

[[routes]]
name = "Home"
path = "/"
view = "HomeView"

[[steps]]
value = "welcome"
route = "Welcome"

[[steps]]
value = "Admin"
"#,
    );

    let routing = GateConfig::load(file.path()).unwrap().build().unwrap();
    assert_eq!(routing.table.len(), 3);

    let gate = routing.gate.unwrap();
    assert_eq!(gate.steps().len(), 2);
    assert_eq!(gate.steps()[1].route, name("Admin"));

    let done = StatusOutcome::Ready(SetupStatus::new("done"));
    assert!(gate.decide(&name("Home"), &done).is_allow());

    let welcome = StatusOutcome::Ready(SetupStatus::new("welcome"));
    assert_eq!(
        gate.decide(&name("Home"), &welcome).redirect_target(),
        Some(&name("Welcome"))
    );
}

#[test]
fn test_step_routing_to_unknown_route_is_rejected() {
    let file = write_config(
        r#"
[[steps]]
value = "start"
route = "Nowhere"
"#,
    );

    let result = GateConfig::load(file.path()).unwrap().build();
    assert!(matches!(result, Err(GateError::StepRouteMissing { .. })));
}

#[test]
fn test_per_route_scope() {
    let file = write_config("layout = \"setup\"\nguard_scope = \"per_route\"\n");

    let routing = GateConfig::load(file.path()).unwrap().build().unwrap();
    assert_eq!(routing.scope, GuardScope::PerRoute);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let result = GateConfig::load(&path);
    assert!(matches!(result, Err(GateError::IoError(_))));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_config("layout = [not toml");

    let result = GateConfig::load(file.path());
    assert!(matches!(result, Err(GateError::ConfigError(_))));
}

#[test]
fn test_unknown_layout_is_config_error() {
    let file = write_config("layout = \"kiosk\"\n");

    let result = GateConfig::load(file.path());
    assert!(matches!(result, Err(GateError::ConfigError(_))));
}
