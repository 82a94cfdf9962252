use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::services::speech::{preferred_japanese_voice, Voice};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).patch(patch_settings))
        .route("/voice", post(select_default_voice))
}

async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().get_user_settings()?))
}

async fn patch_settings(
    State(state): State<AppState>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().merge_user_settings(&patch)?))
}

#[derive(Debug, Deserialize)]
struct VoiceListRequest {
    voices: Vec<Voice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    selected_voice_id: Option<String>,
}

/// Device voice list in, effective selection out. An existing choice is
/// never replaced.
async fn select_default_voice(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<VoiceListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let current = state.store().get_user_settings()?.selected_voice_id;
    if current.is_some() {
        return Ok(ok(VoiceSelection { selected_voice_id: current }));
    }

    let selected = match preferred_japanese_voice(&req.voices) {
        Some(voice) => Some(state.store().select_voice_if_unset(&voice.id)?),
        None => {
            tracing::info!(voices = req.voices.len(), "No Japanese voice available on device");
            None
        }
    };
    Ok(ok(VoiceSelection { selected_voice_id: selected }))
}
