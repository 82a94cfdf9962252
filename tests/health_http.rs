mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::http::{request, response_json};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_app().await;

    let live = request(&app.app, Method::GET, "/health/live", None).await;
    let (live_status, _, _) = response_json(live).await;
    assert_eq!(live_status, StatusCode::OK);

    let ready = request(&app.app, Method::GET, "/health/ready", None).await;
    let (ready_status, _, _) = response_json(ready).await;
    assert_eq!(ready_status, StatusCode::OK);
}

#[tokio::test]
async fn it_health_reports_gateway_mode_and_version() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::GET, "/health", None).await;
    let (status, headers, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["gatewayMode"], "mock");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn it_health_store_is_ok() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::GET, "/health/store", None).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert!(body["latencyUs"].is_u64());
}
