use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use crate::store::keys::USER_SETTINGS;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/store", get(store_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.uptime_secs(),
        "gatewayMode": gateway_mode(&state),
        "now": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once the store answers a read.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.store().has_blob(USER_SETTINGS).is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn store_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let probe = state.store().has_blob(USER_SETTINGS);
    let latency_us = start.elapsed().as_micros() as u64;

    let status = if probe.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let size_bytes = state.store().raw_db().size_on_disk().ok();

    (
        status,
        Json(serde_json::json!({
            "healthy": probe.is_ok(),
            "latencyUs": latency_us,
            "sizeOnDiskBytes": size_bytes,
        })),
    )
}

fn gateway_mode(state: &AppState) -> &'static str {
    let gateway = &state.config().gateway;
    match (gateway.enabled, gateway.mock) {
        (false, _) => "disabled",
        (true, true) => "mock",
        (true, false) => "remote",
    }
}
