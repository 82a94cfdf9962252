use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use nihongo_trainer::config::Config;
use nihongo_trainer::logging::{init_tracing, LogConfig};
use nihongo_trainer::progress::engine::ProgressEngine;
use nihongo_trainer::routes::build_router;
use nihongo_trainer::services::build_gateway;
use nihongo_trainer::services::llm_provider::LlmProvider;
use nihongo_trainer::state::AppState;
use nihongo_trainer::store::Store;
use nihongo_trainer::workers::WorkerManager;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting nihongo-trainer bridge");

    if let Err(message) = LlmProvider::validate_config(&config.gateway) {
        tracing::error!(%message, "Invalid gateway configuration");
        std::process::exit(1);
    }

    let store = Arc::new(Store::open(&config.sled_path).expect("Failed to open sled database"));
    store.run_migrations().expect("Failed to run migrations");

    let gateway = build_gateway(&config.gateway);
    let engine = Arc::new(ProgressEngine::new(store.clone(), gateway));

    let kanji = engine.load_kanji().await;
    let katakana = engine.load_katakana().await;
    let words = engine.load_words().await;
    tracing::info!(
        kanji = kanji.len(),
        katakana = katakana.len(),
        words = words.len(),
        "Collections loaded"
    );

    // 启动时补做一次解锁，失败只记录，不阻塞启动
    let report = engine.sweep_unlocks(&kanji).await;
    if !report.is_clean() {
        tracing::warn!(failed = report.failed.len(), "Startup unlock sweep left glyphs for retry");
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(engine.clone(), &config, shutdown_tx.clone());

    let worker_manager = WorkerManager::new(engine.clone(), shutdown_tx.subscribe(), &config.worker);
    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker_manager.start().await {
            tracing::error!(error = %e, "Worker manager failed");
        }
    });

    let app = build_router(state)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server_future = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    tokio::spawn(async move {
        match worker_handle.await {
            Err(e) => tracing::error!(error = %e, "Worker task panicked, bridge keeps serving"),
            Ok(()) => tracing::info!("Worker manager exited"),
        }
    });

    if let Err(e) = server_future.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::HeaderName::from_static("x-request-id")])
        .allow_methods(Any);

    if config.cors_origin.trim() == "*" {
        return base.allow_origin(Any);
    }

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            panic!(
                "FATAL: Invalid CORS_ORIGIN '{}': {}. Fix the CORS_ORIGIN environment variable.",
                config.cors_origin, e
            );
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
