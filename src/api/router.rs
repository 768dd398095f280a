use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::health;
use super::keys;
use super::middleware::logging_middleware;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Key endpoints
        .route("/create", post(keys::issue_key))
        .route("/check", post(keys::check_key))
        .route("/api/keys", post(keys::issue_key))
        .route("/api/keys/check", post(keys::check_key))
        .route("/api/keys/current", get(keys::current_key))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Serve files under `static_dir` for every path no route claims
///
/// Leaves the router untouched when the directory does not exist.
pub fn with_static_dir(router: Router, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();

    if static_dir.is_dir() {
        router.fallback_service(ServeDir::new(static_dir))
    } else {
        tracing::debug!(dir = %static_dir.display(), "Static directory not found, skipping");
        router
    }
}
