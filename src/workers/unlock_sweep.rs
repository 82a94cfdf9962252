use crate::progress::engine::ProgressEngine;

pub async fn run(engine: &ProgressEngine) {
    tracing::debug!("unlock_sweep: start");
    match engine.sweep_stored().await {
        Ok(report) if report.is_clean() => tracing::info!(
            examined = report.examined,
            unlocked = report.unlocked.len(),
            no_words = report.no_words.len(),
            words_added = report.words_added,
            "unlock_sweep: done"
        ),
        Ok(report) => tracing::warn!(
            examined = report.examined,
            unlocked = report.unlocked.len(),
            failed = report.failed.len(),
            "unlock_sweep: done with failures"
        ),
        Err(e) => tracing::error!(error = %e, "unlock_sweep failed"),
    }
}
