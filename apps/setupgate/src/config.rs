//! # Configuration
//!
//! TOML configuration for the gate, with environment overrides.
//!
//! ```toml
//! status_url = "http://127.0.0.1:9090/v1/config/setup"
//! timeout_ms = 5000
//! layout = "wizard"            # setup | wizard | pages
//! guard_scope = "global"       # global | per_route
//! strict_unknown_steps = false
//!
//! # Optional: replace the preset entirely.
//! [[routes]]
//! name = "Root"
//! path = "/"
//! view = "Root"
//! guarded = true
//!
//! [[steps]]
//! value = "start"
//! route = "Setup"
//! ```
//!
//! ## Environment Variables
//!
//! - `SETUPGATE_STATUS_URL`: overrides `status_url`
//! - `SETUPGATE_TIMEOUT_MS`: overrides `timeout_ms`

use serde::{Deserialize, Serialize};
use setupgate_core::{
    GateError, GuardScope, Layout, RouteName, RouteTable, RouteSpec, SetupGate, SetupStep,
    UnknownStepPolicy,
    primitives::{DEFAULT_STATUS_TIMEOUT_MS, DEFAULT_STATUS_URL},
};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "setupgate.toml";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// FILE FORMAT
// =============================================================================

/// A setup step as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Status value naming the step.
    pub value: String,
    /// Route serving the step; defaults to `value`.
    #[serde(default)]
    pub route: Option<String>,
}

/// Gate configuration as loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    pub status_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub layout: Option<Layout>,
    pub guard_scope: Option<GuardScope>,
    pub strict_unknown_steps: bool,
    /// Explicit route table; replaces the layout's routes when non-empty.
    pub routes: Vec<RouteSpec>,
    /// Explicit setup steps; replace the layout's steps when non-empty.
    pub steps: Vec<StepSpec>,
    /// Explicit allow-list; when empty it is exactly the step routes.
    pub allow: Vec<String>,
    /// Status values meaning "setup complete"; replace the layout's when non-empty.
    pub complete: Vec<String>,
}

/// Everything the navigator is built from.
#[derive(Debug, Clone)]
pub struct Routing {
    pub layout: Layout,
    pub table: RouteTable,
    pub gate: Option<SetupGate>,
    pub scope: GuardScope,
}

impl GateConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, GateError> {
        toml::from_str(text).map_err(|e| GateError::ConfigError(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            GateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(GateError::ConfigError(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            GateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` if given, else `setupgate.toml` if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, GateError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    tracing::info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                    Self::load(default)
                } else {
                    tracing::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, GateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SETUPGATE_STATUS_URL").filter(|u| !u.is_empty()) {
            self.status_url = Some(url);
        }
        if let Some(raw) = lookup("SETUPGATE_TIMEOUT_MS").filter(|t| !t.is_empty()) {
            let ms = raw.parse::<u64>().map_err(|e| {
                GateError::ConfigError(format!("SETUPGATE_TIMEOUT_MS={raw:?}: {e}"))
            })?;
            self.timeout_ms = Some(ms);
        }
        Ok(self)
    }

    /// Apply process environment overrides.
    pub fn apply_process_env(self) -> Result<Self, GateError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Effective status endpoint URL.
    pub fn status_url(&self) -> &str {
        self.status_url.as_deref().unwrap_or(DEFAULT_STATUS_URL)
    }

    /// Effective status fetch timeout.
    pub fn timeout(&self) -> Result<Duration, GateError> {
        match self.timeout_ms.unwrap_or(DEFAULT_STATUS_TIMEOUT_MS) {
            0 => Err(GateError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            )),
            ms => Ok(Duration::from_millis(ms)),
        }
    }

    /// Build the route table and gate, checking every invariant.
    pub fn build(&self) -> Result<Routing, GateError> {
        let layout = self.layout.unwrap_or_default();

        let table = if self.routes.is_empty() {
            layout.route_table()?
        } else {
            RouteTable::from_specs(&self.routes)?
        };

        let steps = if self.steps.is_empty() {
            layout.steps()?
        } else {
            self.steps
                .iter()
                .map(|s| SetupStep::new(&s.value, s.route.as_deref().unwrap_or(&s.value)))
                .collect::<Result<Vec<_>, _>>()?
        };

        let gate = if steps.is_empty() {
            if !self.allow.is_empty() || !self.complete.is_empty() {
                tracing::warn!("allow/complete configured but layout has no setup steps; ignoring");
            }
            None
        } else {
            let gate = if self.allow.is_empty() {
                SetupGate::new(steps)?
            } else {
                let allow = self
                    .allow
                    .iter()
                    .map(RouteName::new)
                    .collect::<Result<BTreeSet<_>, _>>()?;
                SetupGate::with_allow_list(steps, allow)?
            };

            let gate = if self.complete.is_empty() {
                gate.with_completion_values(layout.completion_values().iter().copied())
            } else {
                gate.with_completion_values(self.complete.iter().cloned())
            };

            let policy = if self.strict_unknown_steps {
                UnknownStepPolicy::Strict
            } else {
                UnknownStepPolicy::Permissive
            };
            let gate = gate.with_policy(policy);
            gate.validate_against(&table)?;
            Some(gate)
        };

        Ok(Routing {
            layout,
            table,
            gate,
            scope: self.guard_scope.unwrap_or_default(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
