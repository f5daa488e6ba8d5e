//! # Gate Server Module
//!
//! Server-side rendition of the global pre-navigation hook, using axum.
//!
//! Every browser navigation that reaches the server passes through the setup
//! gate before a view is served.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /routes` - Route table, setup steps and allow-list
//! - `GET /navigate?to=<name>&from=<name>` - Evaluate a navigation by name
//! - `GET <any other path>` - Guarded page: 200 with the view, 307 into the
//!   setup flow, or 404
//!
//! Routes registered at one of these endpoint paths would never reach the
//! guard, so [`ensure_servable`] rejects them before the server starts.
//!
//! ## Configuration (Environment Variables)
//!
//! - `SETUPGATE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost on the served port)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `setupgate::api::*`)
#[allow(unused_imports)]
pub use handlers::{health_handler, navigate_handler, page_handler, routes_handler};
#[allow(unused_imports)]
pub use types::{
    ErrorResponse, HealthResponse, NavigateQuery, NavigateResponse, PageResponse, RoutesResponse,
};

use crate::navigator::Navigator;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use setupgate_core::{GateError, RouteTable};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Paths answered by the server itself instead of the guarded fallback.
pub const RESERVED_PATHS: [&str; 3] = ["/health", "/routes", "/navigate"];

/// Port assumed for the default CORS origins when none is given.
pub const DEFAULT_PORT: u16 = 8080;

/// Reject a route table with a route the server endpoints would shadow.
pub fn ensure_servable(table: &RouteTable) -> Result<(), GateError> {
    match RESERVED_PATHS
        .iter()
        .find(|path| table.match_path(path).is_ok())
    {
        Some(path) => Err(GateError::ReservedPath((*path).to_string())),
        None => Ok(()),
    }
}

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the navigator.
#[derive(Clone)]
pub struct AppState {
    /// The navigator evaluating every request.
    pub navigator: Arc<Navigator>,
    /// Port the server listens on; the default CORS origins follow it.
    pub port: u16,
}

impl AppState {
    /// Create new app state with a navigator.
    #[must_use]
    pub fn new(navigator: Navigator) -> Self {
        Self {
            navigator: Arc::new(navigator),
            port: DEFAULT_PORT,
        }
    }

    /// Set the served port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// CORS layer for the gate server.
///
/// `SETUPGATE_CORS_ORIGINS=*` allows any origin, a comma-separated list allows
/// exactly those, and anything else falls back to localhost on `port`.
fn build_cors_layer(port: u16) -> CorsLayer {
    let configured = std::env::var("SETUPGATE_CORS_ORIGINS").ok();
    if configured.as_deref() == Some("*") {
        tracing::warn!("CORS: allowing all origins");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = configured
        .iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "CORS: ignoring invalid origin");
                None
            }
        })
        .collect();

    let origins = if origins.is_empty() {
        localhost_origins(port)
    } else {
        origins
    };
    tracing::debug!(?origins, "CORS origins");

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn localhost_origins(port: u16) -> Vec<HeaderValue> {
    ["localhost", "127.0.0.1"]
        .iter()
        .filter_map(|host| format!("http://{host}:{port}").parse().ok())
        .collect()
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
pub fn create_router(state: AppState) -> Router {
    if state.navigator.gate().is_none() {
        tracing::info!("No setup gate configured; all routes are served unguarded");
    }
    let cors = build_cors_layer(state.port);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/routes", get(handlers::routes_handler))
        .route("/navigate", get(handlers::navigate_handler))
        .fallback(handlers::page_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the gate server and run until Ctrl+C.
pub async fn run_server(host: &str, port: u16, navigator: Navigator) -> Result<(), GateError> {
    ensure_servable(navigator.table())?;
    let router = create_router(AppState::new(navigator).with_port(port));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GateError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("setupgate server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GateError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
