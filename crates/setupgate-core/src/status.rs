//! # Setup Status
//!
//! The remote setup-status payload and the explicit outcome of fetching it.
//!
//! The status endpoint answers with the standard response envelope:
//!
//! ```text
//! { "code": 200, "message": { "config_key": "setup", "config_val": "site" } }
//! ```
//!
//! Only `message.config_val` matters to the gate. Everything that prevents a
//! usable value from being read collapses into one of two outcomes:
//! `Missing` (the server answered without a usable value) or `Failed` (no
//! usable answer at all). Both send the user to the first setup step.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Response envelope returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    /// Application-level status code mirrored from the HTTP response.
    #[serde(default)]
    pub code: Option<u16>,
    /// Payload; absent or `null` when setup has never been configured.
    #[serde(default)]
    pub message: Option<StatusMessage>,
}

/// The configuration row carried in `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub config_key: Option<String>,
    #[serde(default)]
    pub config_val: Option<String>,
}

impl StatusEnvelope {
    /// Envelope carrying the given step value.
    #[must_use]
    pub fn with_value(config_val: impl Into<String>) -> Self {
        Self {
            code: Some(200),
            message: Some(StatusMessage {
                config_key: Some("setup".to_string()),
                config_val: Some(config_val.into()),
            }),
        }
    }

    /// Envelope with no payload at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            code: Some(200),
            message: None,
        }
    }

    /// Decode a raw response body.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

// =============================================================================
// SETUP STATUS
// =============================================================================

/// A usable setup status: the step value the server reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetupStatus {
    pub config_val: String,
}

impl SetupStatus {
    /// Create a status from a step value.
    #[must_use]
    pub fn new(config_val: impl Into<String>) -> Self {
        Self {
            config_val: config_val.into(),
        }
    }
}

/// Why a status fetch produced no usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchFailure {
    /// The endpoint could not be reached.
    Transport(String),
    /// No answer arrived before the deadline.
    Timeout,
    /// The endpoint answered with a non-success HTTP status.
    HttpStatus(u16),
    /// The body was not a valid status envelope.
    Malformed(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::Timeout => write!(f, "status fetch timed out"),
            Self::HttpStatus(code) => write!(f, "status endpoint returned HTTP {code}"),
            Self::Malformed(msg) => write!(f, "malformed status body: {msg}"),
        }
    }
}

/// Outcome of one status fetch, consumed by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The server reported a step value.
    Ready(SetupStatus),
    /// The server answered but carried no usable value.
    Missing,
    /// No usable answer.
    Failed(FetchFailure),
}

impl StatusOutcome {
    /// Interpret a decoded envelope.
    ///
    /// A missing `message`, a missing `config_val` and an empty `config_val`
    /// all mean "setup not started". Any other value is kept verbatim, so
    /// `" start"` does not name the `start` step.
    #[must_use]
    pub fn from_envelope(envelope: &StatusEnvelope) -> Self {
        envelope
            .message
            .as_ref()
            .and_then(|m| m.config_val.as_deref())
            .filter(|v| !v.is_empty())
            .map(|v| Self::Ready(SetupStatus::new(v)))
            .unwrap_or(Self::Missing)
    }

    /// Collapse a fetch result into an outcome.
    #[must_use]
    pub fn from_result(result: Result<StatusEnvelope, FetchFailure>) -> Self {
        match result {
            Ok(envelope) => Self::from_envelope(&envelope),
            Err(failure) => Self::Failed(failure),
        }
    }

    /// The reported step value, if any.
    #[must_use]
    pub fn config_val(&self) -> Option<&str> {
        match self {
            Self::Ready(status) => Some(&status.config_val),
            Self::Missing | Self::Failed(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn from_body(body: &[u8]) -> StatusOutcome {
        StatusOutcome::from_result(
            StatusEnvelope::decode(body).map_err(|e| FetchFailure::Malformed(e.to_string())),
        )
    }

    #[test]
    fn envelope_with_value_is_ready() {
        let outcome = StatusOutcome::from_envelope(&StatusEnvelope::with_value("site"));
        assert_eq!(outcome, StatusOutcome::Ready(SetupStatus::new("site")));
        assert_eq!(outcome.config_val(), Some("site"));
    }

    #[test]
    fn null_message_is_missing() {
        let outcome = from_body(br#"{"code":200,"message":null}"#);
        assert_eq!(outcome, StatusOutcome::Missing);
    }

    #[test]
    fn absent_config_val_is_missing() {
        let outcome = from_body(br#"{"code":200,"message":{"config_key":"setup"}}"#);
        assert_eq!(outcome, StatusOutcome::Missing);
    }

    #[test]
    fn empty_config_val_is_missing() {
        let outcome = from_body(br#"{"message":{"config_val":""}}"#);
        assert_eq!(outcome, StatusOutcome::Missing);
    }

    #[test]
    fn config_val_is_not_trimmed() {
        let outcome = from_body(br#"{"message":{"config_val":" start"}}"#);
        assert_eq!(outcome.config_val(), Some(" start"));
    }

    #[test]
    fn garbage_body_is_failed() {
        let outcome = from_body(b"<html>502</html>");
        assert!(matches!(
            outcome,
            StatusOutcome::Failed(FetchFailure::Malformed(_))
        ));
    }

    #[test]
    fn failed_result_is_preserved() {
        let outcome = StatusOutcome::from_result(Err(FetchFailure::Timeout));
        assert_eq!(outcome, StatusOutcome::Failed(FetchFailure::Timeout));
        assert_eq!(outcome.config_val(), None);
    }

    #[test]
    fn failure_serializes_tagged() {
        let json = serde_json::to_string(&FetchFailure::HttpStatus(503)).expect("serialize");
        assert_eq!(json, r#"{"kind":"http_status","detail":503}"#);
    }
}
