//! # setupgate
//!
//! Library half of the setupgate binary, exposed for integration tests.
//!
//! - `status_client` fetches the remote setup flag
//! - `navigator` runs the gate around every navigation
//! - `config` loads the TOML configuration
//! - `api` serves guarded navigations over HTTP
//! - `cli` wires everything to the command line

pub mod api;
pub mod cli;
pub mod config;
pub mod navigator;
pub mod status_client;
