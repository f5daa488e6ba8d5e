//! # Layout Presets
//!
//! The three route layouts the application has shipped with.
//!
//! | Layout | Routes | Gate |
//! |--------|--------|------|
//! | `setup` | `Setup:/setup`, `Root:/` (guarded) | step `start` → `Setup` |
//! | `wizard` | `start:/start`, `site:/site`, `Root:/` (guarded) | steps `start`, `site`; `Root` = complete |
//! | `pages` | `Root:/`, `Page:/pages/:id` | none |

use crate::guard::{SetupGate, SetupStep};
use crate::routes::{RouteRecord, RouteTable};
use crate::GateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named route layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Single setup page in front of the root view.
    Setup,
    /// Multi-step setup wizard in front of the root view.
    #[default]
    Wizard,
    /// Plain page viewer with no setup flow.
    Pages,
}

impl Layout {
    /// All layouts, in release order.
    pub const ALL: [Layout; 3] = [Layout::Setup, Layout::Wizard, Layout::Pages];

    /// Stable identifier used in configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Setup => "setup",
            Layout::Wizard => "wizard",
            Layout::Pages => "pages",
        }
    }

    /// Route records for this layout.
    pub fn routes(&self) -> Result<Vec<RouteRecord>, GateError> {
        Ok(match self {
            Layout::Setup => vec![
                RouteRecord::new("Setup", "/setup", "SetupStart")?,
                RouteRecord::new("Root", "/", "Root")?.guarded(),
            ],
            Layout::Wizard => vec![
                RouteRecord::new("start", "/start", "SetupStart")?,
                RouteRecord::new("site", "/site", "SetupSite")?,
                RouteRecord::new("Root", "/", "Root")?.guarded(),
            ],
            Layout::Pages => vec![
                RouteRecord::new("Root", "/", "Root")?,
                RouteRecord::new("Page", "/pages/:id", "Page")?,
            ],
        })
    }

    /// Route table for this layout.
    pub fn route_table(&self) -> Result<RouteTable, GateError> {
        RouteTable::new(self.routes()?)
    }

    /// Setup steps for this layout; empty when the layout has no gate.
    pub fn steps(&self) -> Result<Vec<SetupStep>, GateError> {
        Ok(match self {
            Layout::Setup => vec![SetupStep::new("start", "Setup")?],
            Layout::Wizard => vec![SetupStep::same("start")?, SetupStep::same("site")?],
            Layout::Pages => Vec::new(),
        })
    }

    /// Status values meaning "setup complete".
    #[must_use]
    pub fn completion_values(&self) -> &'static [&'static str] {
        match self {
            Layout::Wizard => &["Root"],
            Layout::Setup | Layout::Pages => &[],
        }
    }

    /// The gate for this layout, if it has one.
    pub fn gate(&self) -> Result<Option<SetupGate>, GateError> {
        let steps = self.steps()?;
        if steps.is_empty() {
            return Ok(None);
        }
        let gate = SetupGate::new(steps)?
            .with_completion_values(self.completion_values().iter().copied());
        Ok(Some(gate))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| {
                GateError::ConfigError(format!(
                    "unknown layout {s:?} (expected setup, wizard or pages)"
                ))
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_builds_a_consistent_table() {
        for layout in Layout::ALL {
            let table = layout.route_table().expect("table");
            if let Some(gate) = layout.gate().expect("gate") {
                gate.validate_against(&table).expect("steps registered");
            }
        }
    }

    #[test]
    fn pages_layout_has_no_gate() {
        assert!(Layout::Pages.gate().expect("gate").is_none());
    }

    #[test]
    fn setup_layout_first_step_is_setup_route() {
        let gate = Layout::Setup.gate().expect("gate").expect("present");
        assert_eq!(gate.first_step().route, "Setup");
        assert_eq!(gate.first_step().value, "start");
    }

    #[test]
    fn layout_parses_from_identifier() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().ok(), Some(layout));
        }
        assert!("kiosk".parse::<Layout>().is_err());
    }
}
