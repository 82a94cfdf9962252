use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::extractors::{JsonBody, KindPath};
use crate::progress::ItemKey;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::keys::CollectionKind;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:kind", get(list_collection))
        .route("/:kind/refresh", post(refresh_collection))
        .route("/:kind/learned", post(mark_learned))
        .route("/:kind/:glyph/words", get(related_words))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum View {
    #[default]
    Active,
    All,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    view: View,
}

async fn list_collection(
    State(state): State<AppState>,
    KindPath(kind): KindPath,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let active_only = matches!(query.view, View::Active);
    ok(state.engine().collection(kind, active_only).await)
}

async fn refresh_collection(
    State(state): State<AppState>,
    KindPath(kind): KindPath,
) -> Result<impl IntoResponse, AppError> {
    let items = state.engine().refresh_kind(kind).await?;
    Ok(ok(items))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearnedRequest {
    key: String,
    #[serde(default)]
    index: Option<usize>,
}

async fn mark_learned(
    State(state): State<AppState>,
    KindPath(kind): KindPath,
    JsonBody(req): JsonBody<LearnedRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.key.trim().is_empty() {
        return Err(AppError::bad_request("VALIDATION_ERROR", "key must not be empty"));
    }
    let key = ItemKey {
        key: req.key,
        index: req.index,
    };
    let result = state.engine().mark_learned(kind, &key).await?;
    Ok(ok(result))
}

async fn related_words(
    State(state): State<AppState>,
    KindPath(kind): KindPath,
    Path((_, glyph)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    if kind != CollectionKind::Kanji {
        return Err(AppError::not_found("Related words exist only for kanji"));
    }
    Ok(ok(state.engine().related_words(&glyph)?))
}
