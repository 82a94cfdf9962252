pub mod unlock_sweep;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::WorkerConfig;
use crate::progress::engine::ProgressEngine;

/// Timeout for individual worker invocations (5 minutes).
const WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Drain period before scheduler shutdown to let in-flight tasks complete.
#[cfg(test)]
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);
#[cfg(not(test))]
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// 后台任务枚举，新增 worker 时编译器会提示补全注册逻辑
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    UnlockSweep,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnlockSweep => "unlock_sweep",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: WorkerName,
    pub cron: String,
    pub enabled: bool,
}

pub struct WorkerManager {
    engine: Arc<ProgressEngine>,
    shutdown_rx: broadcast::Receiver<()>,
    config: WorkerConfig,
}

impl WorkerManager {
    pub fn new(engine: Arc<ProgressEngine>, shutdown_rx: broadcast::Receiver<()>, config: &WorkerConfig) -> Self {
        Self {
            engine,
            shutdown_rx,
            config: config.clone(),
        }
    }

    /// Single source of truth for all planned jobs and their cron schedules.
    pub fn planned_jobs(&self) -> Vec<JobSpec> {
        vec![JobSpec {
            name: WorkerName::UnlockSweep,
            cron: self.config.sweep_cron.clone(),
            enabled: self.config.enable_unlock_sweep,
        }]
    }

    /// Runs until a shutdown signal arrives. Fails only when the scheduler
    /// cannot be created or started.
    pub async fn start(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let specs: Vec<JobSpec> = self.planned_jobs().into_iter().filter(|s| s.enabled).collect();
        if specs.is_empty() {
            tracing::info!("No workers enabled; skipping scheduler startup");
            return Ok(());
        }

        let mut scheduler = JobScheduler::new().await?;
        self.register_jobs(&scheduler, &specs).await;
        scheduler.start().await?;

        tracing::info!(jobs = specs.len(), "Worker manager started");
        let _ = self.shutdown_rx.recv().await;

        tracing::info!(
            "Worker manager shutting down, draining for {}ms",
            DRAIN_TIMEOUT.as_millis()
        );
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        let _ = scheduler.shutdown().await;
        Ok(())
    }

    async fn register_jobs(&self, scheduler: &JobScheduler, specs: &[JobSpec]) {
        for spec in specs {
            let name_str = spec.name.as_str();
            match spec.name {
                WorkerName::UnlockSweep => {
                    let engine = self.engine.clone();
                    add_job(scheduler, &spec.cron, name_str, move || {
                        let engine = engine.clone();
                        async move {
                            unlock_sweep::run(&engine).await;
                        }
                    })
                    .await;
                }
            }
            tracing::info!(name = name_str, cron = %spec.cron, "Registered worker");
        }
    }
}

/// Add a job to the scheduler with an overlap guard and timeout wrapper.
async fn add_job<Fut, F>(scheduler: &JobScheduler, cron: &str, name: &'static str, mut run: F)
where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(false));

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let guard = running.clone();

        if guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(
                worker = name,
                "Skipping worker invocation: previous run still in progress"
            );
            return Box::pin(async {});
        }

        let fut = run();
        Box::pin(async move {
            if tokio::time::timeout(WORKER_TIMEOUT, fut).await.is_err() {
                tracing::error!(
                    worker = name,
                    timeout_secs = WORKER_TIMEOUT.as_secs(),
                    "Worker timed out"
                );
            }
            guard.store(false, Ordering::SeqCst);
        })
    });

    match job {
        Ok(job) => {
            if let Err(err) = scheduler.add(job).await {
                tracing::error!(error = %err, cron, worker = name, "Failed to add worker job");
            }
        }
        Err(err) => tracing::error!(error = %err, cron, worker = name, "Failed to create worker job"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::Config;
    use crate::services::mock_gateway::MockContentGateway;
    use crate::store::Store;

    use super::*;

    fn manager(name: &str, enable: bool) -> (tempfile::TempDir, broadcast::Sender<()>, WorkerManager) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(Store::open(tmp.path().join(name).to_str().unwrap()).unwrap());
        let engine = Arc::new(ProgressEngine::new(store, Arc::new(MockContentGateway)));
        let (tx, _) = broadcast::channel(2);

        let mut worker_cfg = Config::from_env().worker;
        worker_cfg.enable_unlock_sweep = enable;
        worker_cfg.sweep_cron = "0 */30 * * * *".to_string();

        let manager = WorkerManager::new(engine, tx.subscribe(), &worker_cfg);
        (tmp, tx, manager)
    }

    #[tokio::test]
    async fn sweep_switch_controls_job_plan() {
        let (_tmp, _tx, manager) = manager("worker_plan.sled", false);
        let jobs = manager.planned_jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, WorkerName::UnlockSweep);
        assert!(!jobs[0].enabled);
    }

    #[tokio::test]
    async fn disabled_workers_return_immediately() {
        let (_tmp, _tx, manager) = manager("worker_disabled.sled", false);
        manager.start().await.expect("start without jobs should succeed");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_signal_stops_scheduler() {
        let (_tmp, tx, manager) = manager("worker_shutdown.sled", true);
        let handle = tokio::spawn(manager.start());
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = tx.send(());
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn sweep_job_tolerates_empty_store() {
        let (_tmp, _tx, manager) = manager("worker_run.sled", true);
        unlock_sweep::run(&manager.engine).await;
    }
}
