use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::progress::stats;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn stats_router() -> Router<AppState> {
    Router::new().route("/", get(get_stats))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reset", post(reset_progress))
}

async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    ok(stats::collect(state.store()))
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    #[serde(default)]
    confirm: bool,
}

/// Irreversible. The shell must have asked the user first and says so with
/// `"confirm": true`.
async fn reset_progress(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !req.confirm {
        return Err(AppError::bad_request(
            "CONFIRMATION_REQUIRED",
            "Resetting progress cannot be undone; send {\"confirm\": true}",
        ));
    }
    let summary = state.engine().reset_all_progress().await?;
    Ok(ok(summary))
}
