//! # setupgate - Setup-Wizard Navigation Guard
//!
//! The main binary for setupgate.
//!
//! This application provides:
//! - Gate server (axum-based) guarding every navigation
//! - CLI interface for checking navigations and validating configuration
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  apps/setupgate (THE BINARY)              │
//! │                                                           │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────┐   │
//! │  │   CLI       │    │ Gate Server │    │ Status Client│   │
//! │  │  (clap)     │    │   (axum)    │    │  (reqwest)   │   │
//! │  └──────┬──────┘    └──────┬──────┘    └──────┬───────┘   │
//! │         └──────────────────┼──────────────────┘           │
//! │                            ▼                              │
//! │                 ┌────────────────────┐                    │
//! │                 │   setupgate-core   │                    │
//! │                 │    (THE LOGIC)     │                    │
//! │                 └────────────────────┘                    │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the gate server
//! setupgate serve --host 0.0.0.0 --port 8080
//!
//! # One-off checks
//! setupgate check Root
//! setupgate check --path /pages/42 --layout pages
//! setupgate validate --config setupgate.toml
//! ```

use clap::Parser;
use setupgate::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SETUPGATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SETUPGATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "setupgate=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  setupgate v{}
  every navigation passes the setup gate
"#,
        env!("CARGO_PKG_VERSION")
    );
}
