//! Route definitions for the gateway.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/entities/{*path}",
            get(handlers::get_entities).post(handlers::post_entities),
        )
        .route("/siteurl", post(handlers::post_siteurl))
        .route("/file/{*path}", get(handlers::get_file))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
