//! # Route Table
//!
//! Declarative route records and path matching.
//!
//! A `RouteTable` is built once from a list of `RouteRecord`s and exposes
//! read-only lookups afterwards. There is no API to add or remove a route
//! from an existing table.
//!
//! ## Path Patterns
//!
//! | Pattern | Matches | Params |
//! |---------|---------|--------|
//! | `/` | `/` | none |
//! | `/setup` | `/setup`, `/setup/` | none |
//! | `/pages/:id` | `/pages/42` | `id = "42"` |

use crate::primitives::{MAX_PATH_SEGMENTS, MAX_ROUTES};
use crate::{GateError, RouteName, RouteParams, ViewRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// PATH PATTERN
// =============================================================================

/// One segment of a parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text that must match exactly.
    Static(String),
    /// `:name` placeholder capturing any non-empty segment.
    Param(String),
}

/// A parsed path pattern such as `/pages/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. It must start with `/` and contain no empty segments.
    pub fn parse(raw: &str) -> Result<Self, GateError> {
        let invalid = |reason: &str| GateError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let trimmed = trim_path(raw);
        let mut segments = Vec::new();
        let mut seen_params = BTreeSet::new();

        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty segment"));
                }
                if let Some(name) = part.strip_prefix(':') {
                    if name.is_empty() {
                        return Err(invalid("parameter without a name"));
                    }
                    if !seen_params.insert(name.to_string()) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    segments.push(Segment::Param(name.to_string()));
                } else {
                    segments.push(Segment::Static(part.to_string()));
                }
            }
        }

        if segments.len() > MAX_PATH_SEGMENTS {
            return Err(invalid("too many segments"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern exactly as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a concrete path, returning captured parameters on success.
    ///
    /// A query string or fragment is ignored. A trailing slash is tolerated.
    /// The request path is split at most one segment past the pattern's depth.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trim_path(path);

        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').take(self.segments.len() + 1).collect()
        };

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(text) => {
                    if text != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    /// Build a concrete path, substituting parameters.
    pub(crate) fn render(
        &self,
        route: &RouteName,
        params: &RouteParams,
    ) -> Result<String, GateError> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Static(text) => out.push_str(text),
                Segment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| GateError::MissingParam {
                        route: route.clone(),
                        param: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Canonical shape used for duplicate detection: params are anonymous.
    fn shape(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Static(text) => out.push_str(text),
                Segment::Param(_) => out.push(':'),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip leading and trailing slashes.
fn trim_path(path: &str) -> &str {
    path.trim_start_matches('/').trim_end_matches('/')
}

// =============================================================================
// ROUTE RECORD
// =============================================================================

/// A single registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// Identifier used by navigation attempts and redirects.
    pub name: RouteName,
    /// Path pattern exposed to the address bar.
    pub path: PathPattern,
    /// Display unit rendered when the route commits.
    pub view: ViewRef,
    /// Whether this route carries its own guard (`beforeEnter`).
    pub guarded: bool,
}

impl RouteRecord {
    /// Create an unguarded record.
    pub fn new(name: &str, path: &str, view: &str) -> Result<Self, GateError> {
        Ok(Self {
            name: RouteName::new(name)?,
            path: PathPattern::parse(path)?,
            view: ViewRef::new(view),
            guarded: false,
        })
    }

    /// Mark the record as carrying a per-route guard.
    #[must_use]
    pub fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }
}

/// Serializable description of a record, used by configuration files and
/// by the JSON route listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub name: String,
    pub path: String,
    pub view: String,
    #[serde(default)]
    pub guarded: bool,
}

impl TryFrom<&RouteSpec> for RouteRecord {
    type Error = GateError;

    fn try_from(spec: &RouteSpec) -> Result<Self, Self::Error> {
        let record = RouteRecord::new(&spec.name, &spec.path, &spec.view)?;
        Ok(if spec.guarded { record.guarded() } else { record })
    }
}

impl From<&RouteRecord> for RouteSpec {
    fn from(record: &RouteRecord) -> Self {
        Self {
            name: record.name.to_string(),
            path: record.path.to_string(),
            view: record.view.as_str().to_string(),
            guarded: record.guarded,
        }
    }
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// Result of matching a path or resolving a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub record: &'a RouteRecord,
    pub params: RouteParams,
}

/// Immutable, ordered collection of route records.
///
/// Path matching walks records in registration order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
    by_name: BTreeMap<RouteName, usize>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate names and duplicate path shapes.
    pub fn new(records: Vec<RouteRecord>) -> Result<Self, GateError> {
        if records.len() > MAX_ROUTES {
            return Err(GateError::ConfigError(format!(
                "route table has {} records, maximum is {}",
                records.len(),
                MAX_ROUTES
            )));
        }

        let mut by_name = BTreeMap::new();
        let mut shapes = BTreeSet::new();

        for (index, record) in records.iter().enumerate() {
            if by_name.insert(record.name.clone(), index).is_some() {
                return Err(GateError::DuplicateRouteName(record.name.clone()));
            }
            if !shapes.insert(record.path.shape()) {
                return Err(GateError::DuplicateRoutePath(record.path.to_string()));
            }
        }

        Ok(Self { records, by_name })
    }

    /// Build a table from serializable specs.
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self, GateError> {
        let records = specs
            .iter()
            .map(RouteRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(records)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteRecord> {
        self.records.iter()
    }

    /// Whether a route with this name exists.
    #[must_use]
    pub fn contains(&self, name: &RouteName) -> bool {
        self.by_name.contains_key(name)
    }

    /// Look up a record by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Look up a record by name, failing with `UnknownRoute`.
    pub fn require(&self, name: &str) -> Result<&RouteRecord, GateError> {
        self.get(name)
            .ok_or_else(|| GateError::UnknownRoute(name.to_string()))
    }

    /// Match a concrete path against the table.
    pub fn match_path(&self, path: &str) -> Result<RouteMatch<'_>, GateError> {
        self.records
            .iter()
            .find_map(|record| {
                record
                    .path
                    .matches(path)
                    .map(|params| RouteMatch { record, params })
            })
            .ok_or_else(|| GateError::NoMatchingPath(path.to_string()))
    }

    /// Build the concrete path for a named route.
    pub fn path_for(&self, name: &RouteName, params: &RouteParams) -> Result<String, GateError> {
        let index = self
            .by_name
            .get(name)
            .ok_or_else(|| GateError::UnknownRoute(name.to_string()))?;
        self.records[*index].path.render(name, params)
    }

    /// Serializable view of every record.
    #[must_use]
    pub fn specs(&self) -> Vec<RouteSpec> {
        self.records.iter().map(RouteSpec::from).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
