//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::{GateConfig, Routing};
use crate::navigator::Navigator;
use crate::status_client::HttpStatusSource;
use setupgate_core::{GateError, Layout, NavigationOutcome};
use std::path::PathBuf;
use std::sync::Arc;

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub status_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub layout: Option<String>,
    pub json_mode: bool,
    pub verbose: bool,
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================

/// Resolve configuration: file, then environment, then command-line flags.
pub fn load_config(options: &Options) -> Result<GateConfig, GateError> {
    let mut config = GateConfig::load_or_default(options.config.as_deref())?.apply_process_env()?;

    if let Some(url) = &options.status_url {
        config.status_url = Some(url.clone());
    }
    if let Some(ms) = options.timeout_ms {
        config.timeout_ms = Some(ms);
    }
    if let Some(layout) = &options.layout {
        config.layout = Some(layout.parse::<Layout>()?);
    }
    Ok(config)
}

/// Build a navigator talking to the configured status endpoint.
pub fn build_navigator(config: &GateConfig, routing: Routing) -> Result<Navigator, GateError> {
    let source = Arc::new(HttpStatusSource::new(config.status_url()));
    Ok(Navigator::new(routing.table, routing.gate, source)?
        .with_scope(routing.scope)
        .with_timeout(config.timeout()?))
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the gate server.
pub async fn cmd_serve(options: &Options, host: &str, port: u16) -> Result<(), GateError> {
    let config = load_config(options)?;
    let routing = config.build()?;
    let layout = routing.layout;
    let navigator = build_navigator(&config, routing)?;

    println!("setupgate server starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", host);
    println!("  Port:       {}", port);
    println!("  Layout:     {}", layout);
    println!("  Status URL: {}", config.status_url());
    println!("  Timeout:    {} ms", navigator.timeout().as_millis());
    println!();
    println!("Endpoints:");
    println!("  GET /health   - Health check");
    println!("  GET /routes   - Route table");
    println!("  GET /navigate - Evaluate a navigation by name");
    println!("  GET /*        - Guarded pages");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(host, port, navigator).await
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Run one guarded navigation and print the outcome.
pub async fn cmd_check(
    options: &Options,
    target: &str,
    from: Option<&str>,
    by_path: bool,
) -> Result<(), GateError> {
    let config = load_config(options)?;
    let navigator = build_navigator(&config, config.build()?)?;

    if options.verbose {
        println!("Checking against {}", config.status_url());
    }

    let outcome = if by_path {
        navigator.navigate_path(target).await?
    } else {
        navigator.navigate(target, from).await?
    };
    let location = outcome.location(navigator.table())?;

    if options.json_mode {
        let output = serde_json::json!({
            "navigation": outcome,
            "location": location,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    match &outcome {
        NavigationOutcome::Committed { route, params } => {
            println!("ALLOW      {}", route);
            if !params.is_empty() {
                for (k, v) in params {
                    println!("  {} = {}", k, v);
                }
            }
        }
        NavigationOutcome::Redirected {
            requested,
            route,
            reason,
        } => {
            println!("REDIRECT   {} -> {} ({})", requested, route, reason);
        }
        NavigationOutcome::Aborted { reason } => {
            println!("ABORT      {}", reason);
        }
    }
    if let Some(location) = location {
        println!("Location:  {}", location);
    }
    Ok(())
}

// =============================================================================
// ROUTES COMMAND
// =============================================================================

/// Show the route table and setup flow.
pub fn cmd_routes(options: &Options) -> Result<(), GateError> {
    let config = load_config(options)?;
    let routing = config.build()?;

    if options.json_mode {
        let steps = routing
            .gate
            .as_ref()
            .map(|g| g.steps().to_vec())
            .unwrap_or_default();
        let output = serde_json::json!({
            "layout": routing.layout,
            "scope": routing.scope,
            "routes": routing.table.specs(),
            "steps": steps,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("Layout: {}", routing.layout);
    println!();
    println!("Routes:");
    for record in routing.table.iter() {
        let marker = if record.guarded { " [guarded]" } else { "" };
        println!(
            "  {:<12} {:<16} {}{}",
            record.name.as_str(),
            record.path.as_str(),
            record.view.as_str(),
            marker
        );
    }

    match &routing.gate {
        Some(gate) => {
            println!();
            println!("Setup flow:");
            for (i, step) in gate.steps().iter().enumerate() {
                println!("  {}. {} -> {}", i + 1, step.value, step.route);
            }
            let allow: Vec<&str> = gate.allow_list().iter().map(|r| r.as_str()).collect();
            println!("Allow-list: {}", allow.join(", "));
            if options.verbose {
                let complete: Vec<&str> =
                    gate.completion_values().iter().map(String::as_str).collect();
                println!("Complete:   {}", complete.join(", "));
                println!("Policy:     {:?}", gate.policy());
            }
        }
        None => {
            println!();
            println!("No setup gate configured.");
        }
    }
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Build everything from configuration; any invariant violation is an error.
pub fn cmd_validate(options: &Options) -> Result<(), GateError> {
    let config = load_config(options)?;
    config.timeout()?;
    let routing = config.build()?;
    api::ensure_servable(&routing.table)?;

    let steps = routing.gate.as_ref().map(|g| g.steps().len()).unwrap_or(0);

    if options.json_mode {
        let output = serde_json::json!({
            "valid": true,
            "layout": routing.layout,
            "routes": routing.table.len(),
            "steps": steps,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        println!(
            "Configuration OK: {} routes, {} setup steps (layout {})",
            routing.table.len(),
            steps,
            routing.layout
        );
    }
    Ok(())
}
