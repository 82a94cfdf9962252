use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::extractors::KindPath;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::keys::CollectionKind;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:kind/:key", get(get_enrichment))
        .route("/:kind/:key/strokes", get(get_strokes))
}

async fn get_enrichment(
    State(state): State<AppState>,
    KindPath(kind): KindPath,
    Path((_, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let details = state.gateway().fetch_item_enrichment(&key, kind).await?;
    Ok(ok(details))
}

async fn get_strokes(
    State(state): State<AppState>,
    KindPath(kind): KindPath,
    Path((_, glyph)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    if kind != CollectionKind::Kanji {
        return Err(AppError::not_found("Stroke data exists only for kanji"));
    }
    let paths = state.gateway().fetch_stroke_render(&glyph).await?;
    Ok(ok(paths))
}
