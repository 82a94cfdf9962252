use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sweep", post(sweep))
        .route("/:glyph", post(unlock_glyph))
}

async fn sweep(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state.engine().sweep_stored().await?;
    Ok(ok(report))
}

async fn unlock_glyph(
    State(state): State<AppState>,
    Path(glyph): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.engine().unlock_vocabulary_for(&glyph).await?;
    Ok(ok(outcome))
}
