//! Origin allow-list.
//!
//! `CorsLayer` sets the response headers browsers need. The
//! [`reject_disallowed_origin`] middleware turns away requests whose
//! `Origin` is not on the list; requests without an `Origin` header
//! (curl, server-to-server) always pass.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the CORS layer for the configured origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

pub fn is_origin_allowed(origin: Option<&str>, allowed: &[String]) -> bool {
    match origin {
        None => true,
        Some(origin) => allowed.iter().any(|a| a == origin),
    }
}

pub async fn reject_disallowed_origin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    if is_origin_allowed(origin.as_deref(), &state.config.server.allowed_origins) {
        return next.run(req).await;
    }

    let origin = origin.unwrap_or_default();
    warn!(origin = %origin, path = %req.uri().path(), "Rejected request from disallowed origin");
    ApiError::Forbidden(format!("CORS not allowed for this origin: {}", origin)).into_response()
}
