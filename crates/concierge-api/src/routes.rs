//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use concierge_core::config::ConciergeConfig;
use concierge_core::error::ConciergeError;

use crate::cors::{cors_layer, reject_disallowed_origin};
use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let json_limit = state.config.server.json_body_limit;
    let audio_limit = state.config.server.audio_body_limit;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/text",
            post(handlers::text).layer(DefaultBodyLimit::max(json_limit)),
        )
        .route(
            "/api/voice",
            post(handlers::voice).layer(DefaultBodyLimit::max(audio_limit)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            reject_disallowed_origin,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn start_server(config: &ConciergeConfig, state: AppState) -> Result<(), ConciergeError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        origins = ?config.server.allowed_origins,
        "Concierge API listening"
    );

    axum::serve(listener, router).await?;
    Ok(())
}
