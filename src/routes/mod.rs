pub mod collections;
pub mod enrichment;
pub mod health;
pub mod progress;
pub mod recognition;
pub mod settings;
pub mod unlocks;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware::request_id;
use crate::state::AppState;

/// Stroke captures are the largest bodies the shell sends.
const MAX_BODY_SIZE: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/collections", collections::router())
        .nest("/unlocks", unlocks::router())
        .nest("/stats", progress::stats_router())
        .nest("/progress", progress::router())
        .nest("/settings", settings::router())
        .nest("/enrichment", enrichment::router())
        .nest("/recognition", recognition::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
