//! # Setup Status Client
//!
//! Fetches the remote setup flag.
//!
//! [`StatusSource`] is the seam the navigator depends on; [`HttpStatusSource`]
//! is the production implementation. Tests substitute their own source.

use async_trait::async_trait;
use setupgate_core::{FetchFailure, StatusEnvelope};
use thiserror::Error;

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Cannot reach the status endpoint.
    #[error("Cannot connect to status endpoint at {0}")]
    ConnectionFailed(String),
    /// The request itself timed out inside the HTTP client.
    #[error("Status request timed out: {0}")]
    Timeout(String),
    /// The endpoint returned a non-success status.
    #[error("Status endpoint returned HTTP {0}")]
    HttpStatus(u16),
    /// Failed to parse response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<FetchError> for FetchFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::ConnectionFailed(msg) => FetchFailure::Transport(msg),
            FetchError::Timeout(_) => FetchFailure::Timeout,
            FetchError::HttpStatus(code) => FetchFailure::HttpStatus(code),
            FetchError::ParseError(msg) => FetchFailure::Malformed(msg),
        }
    }
}

/// Anything that can report the current setup status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Human-readable target, for logs.
    fn describe(&self) -> String;

    /// Fetch the status once. Never cached.
    async fn fetch(&self) -> Result<StatusEnvelope, FetchError>;
}

/// HTTP client for the setup-status endpoint.
#[derive(Clone)]
pub struct HttpStatusSource {
    http: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    /// Create a client for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    /// GET the endpoint and decode the envelope.
    async fn fetch(&self) -> Result<StatusEnvelope, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::ConnectionFailed(format!("{}: {e}", self.url))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::ConnectionFailed(format!("{}: {e}", self.url)))?;

        StatusEnvelope::decode(&body).map_err(|e| FetchError::ParseError(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
