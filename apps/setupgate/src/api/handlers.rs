//! # API Endpoint Handlers
//!
//! This module implements the gate server's HTTP handlers.

use super::{
    AppState,
    types::{
        ErrorResponse, HealthResponse, NavigateQuery, NavigateResponse, PageResponse,
        RoutesResponse,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use setupgate_core::{GateError, Resolution, RouteParams};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// ROUTES HANDLER
// =============================================================================

/// List the route table, setup steps and allow-list.
pub async fn routes_handler(State(state): State<AppState>) -> impl IntoResponse {
    let navigator = &state.navigator;
    let (steps, allow_list) = match navigator.gate() {
        Some(gate) => (
            gate.steps().to_vec(),
            gate.allow_list().iter().map(|r| r.to_string()).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let scope = serde_json::to_value(navigator.scope())
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    Json(RoutesResponse {
        routes: navigator.table().specs(),
        steps,
        allow_list,
        scope,
    })
}

// =============================================================================
// NAVIGATE HANDLER
// =============================================================================

/// Evaluate a navigation between named routes.
pub async fn navigate_handler(
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Response {
    let navigator = &state.navigator;

    let attempt =
        match navigator.attempt_by_name(&query.to, query.from.as_deref(), RouteParams::new()) {
            Ok(a) => a,
            Err(e) => return error_response(&e),
        };

    let navigation = match navigator.resolve(attempt).await {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };
    match navigation.location(navigator.table()) {
        Ok(location) => Json(NavigateResponse {
            navigation,
            location,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// PAGE HANDLER (FALLBACK)
// =============================================================================

/// Guard any other path: serve it, redirect it into the setup flow, or 404.
pub async fn page_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(ErrorResponse::new("Only GET navigations are guarded")),
        )
            .into_response();
    }

    let navigator = &state.navigator;
    let navigation = match navigator.resolve_path(uri.path()).await {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    match navigation {
        Resolution::Committed { route, params } => {
            let view = navigator
                .table()
                .get(route.as_str())
                .map(|r| r.view.as_str().to_string())
                .unwrap_or_default();
            (
                StatusCode::OK,
                Json(PageResponse {
                    route: route.to_string(),
                    view,
                    params,
                }),
            )
                .into_response()
        }
        redirected @ Resolution::Redirected { .. } => {
            let location = match redirected.location(navigator.table()) {
                Ok(l) => l,
                Err(e) => return error_response(&e),
            };
            (
                StatusCode::TEMPORARY_REDIRECT,
                [(header::LOCATION, location.clone())],
                Json(NavigateResponse {
                    navigation: redirected,
                    location,
                }),
            )
                .into_response()
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Map structural errors onto HTTP status codes.
fn error_response(err: &GateError) -> Response {
    let status = match err {
        GateError::UnknownRoute(_) | GateError::NoMatchingPath(_) => StatusCode::NOT_FOUND,
        GateError::MissingParam { .. } | GateError::InvalidRouteName(_) => StatusCode::BAD_REQUEST,
        _ => {
            tracing::error!("Navigation failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}
