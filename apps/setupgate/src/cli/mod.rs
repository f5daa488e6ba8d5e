//! # setupgate CLI Module
//!
//! This module implements the CLI interface for setupgate.
//!
//! ## Available Commands
//!
//! - `serve` - Start the gate server
//! - `check` - Run one guarded navigation against the live status endpoint
//! - `routes` - Show the route table and setup flow
//! - `validate` - Build the gate from configuration and report problems

mod commands;

use clap::{Parser, Subcommand};
use setupgate_core::GateError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// setupgate - setup-wizard navigation guard
///
/// Every navigation is checked against the remote setup status; until setup
/// is complete, users are sent into the setup flow.
#[derive(Parser, Debug)]
#[command(name = "setupgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file (default: ./setupgate.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Setup-status endpoint URL (overrides config and SETUPGATE_STATUS_URL)
    #[arg(short = 'u', long, global = true)]
    pub status_url: Option<String>,

    /// Status fetch timeout in milliseconds
    #[arg(short, long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Route layout: setup, wizard or pages
    #[arg(short, long, global = true)]
    pub layout: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gate server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Run one guarded navigation and print the decision
    Check {
        /// Target route name (or path with --path)
        target: String,

        /// Source route name
        #[arg(short, long)]
        from: Option<String>,

        /// Treat the target as an address-bar path instead of a route name
        #[arg(long)]
        path: bool,
    },

    /// Show the route table and setup flow
    Routes,

    /// Validate configuration and gate invariants
    Validate,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GateError> {
    let options = Options {
        config: cli.config,
        status_url: cli.status_url,
        timeout_ms: cli.timeout_ms,
        layout: cli.layout,
        json_mode: cli.json_mode,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(&options, &host, port).await,
        Some(Commands::Check { target, from, path }) => {
            cmd_check(&options, &target, from.as_deref(), path).await
        }
        Some(Commands::Routes) => cmd_routes(&options),
        Some(Commands::Validate) => cmd_validate(&options),
        None => {
            // No subcommand - show the route table by default
            cmd_routes(&options)
        }
    }
}
