use super::{AppState, handlers};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the API router with all routes and shared state.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/assets", get(handlers::get_assets))
        .route("/api/funding/batch", post(handlers::get_funding_batch))
        .route("/api/funding/{coin}", get(handlers::get_funding_history))
        .route("/api/funding/{coin}/derived", get(handlers::get_derived_series))
        .route("/api/top", get(handlers::get_top_performers))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
