use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use nihongo_trainer::config::{Config, GatewayConfig, WorkerConfig};
use nihongo_trainer::progress::engine::ProgressEngine;
use nihongo_trainer::routes::build_router;
use nihongo_trainer::services::gateway::ContentGateway;
use nihongo_trainer::state::AppState;
use nihongo_trainer::store::Store;

use super::gateway::ScriptedGateway;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub gateway: Arc<ScriptedGateway>,
    _temp_dir: TempDir,
}

pub struct TestEngine {
    pub engine: Arc<ProgressEngine>,
    pub gateway: Arc<ScriptedGateway>,
    _temp_dir: TempDir,
}

/// 直接构造 Config，避免 set_var 在并行测试中产生环境变量竞态
pub fn test_config(sled_path: &str) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3417,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string(),
        cors_origin: "*".to_string(),
        gateway: GatewayConfig {
            enabled: true,
            mock: true,
            ..GatewayConfig::default()
        },
        worker: WorkerConfig {
            enable_unlock_sweep: false,
            sweep_cron: "0 */30 * * * *".to_string(),
        },
    }
}

fn sled_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("nihongo-test.sled").to_string_lossy().into_owned()
}

fn open_store(temp_dir: &TempDir) -> Arc<Store> {
    let store = Arc::new(Store::open(&sled_path(temp_dir)).expect("open store"));
    store.run_migrations().expect("run migrations");
    store
}

pub fn spawn_engine(gateway: ScriptedGateway) -> TestEngine {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&temp_dir);
    let gateway = Arc::new(gateway);
    let engine = Arc::new(ProgressEngine::new(store, gateway.clone() as Arc<dyn ContentGateway>));
    TestEngine {
        engine,
        gateway,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app_with(gateway: ScriptedGateway) -> TestApp {
    let TestEngine {
        engine,
        gateway,
        _temp_dir,
    } = spawn_engine(gateway);

    let config = test_config(&sled_path(&_temp_dir));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(engine, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        gateway,
        _temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_test_app_with(ScriptedGateway::new().with_kanji(&["一", "二", "七"])).await
}
