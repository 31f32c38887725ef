/// API route modules
pub mod health;
pub mod master;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
///
/// Request bodies larger than `limits.max_upload_mb` are rejected with 413
/// before the handler runs.
pub fn router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_upload_bytes();

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/master", post(master::master_upload));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
