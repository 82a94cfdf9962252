use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::recognition::{recognize, strokes::Point};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(recognize_drawing))
}

#[derive(Debug, Deserialize)]
struct RecognitionRequest {
    /// One inner list per captured path, as the canvas recorded it.
    strokes: Vec<Vec<Point>>,
}

async fn recognize_drawing(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RecognitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = recognize(state.gateway(), &req.strokes).await?;
    Ok(ok(result))
}
