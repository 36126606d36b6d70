use crate::traits::{Worker, WorkerStats};
use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct WorkerRunner;

impl WorkerRunner {
    /// Runs a worker until it returns, cancelling it on Ctrl+C.
    pub async fn run_worker(worker: &dyn Worker) -> Result<WorkerStats> {
        let token = CancellationToken::new();
        let cloned_token = token.clone();

        // Spawn a task to listen for Ctrl+C
        let signal_task = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        let stats = Self::run_with_token(worker, token).await;
        signal_task.abort();
        stats
    }

    /// Runs a worker under an externally owned token and logs a summary.
    pub async fn run_with_token(
        worker: &dyn Worker,
        token: CancellationToken,
    ) -> Result<WorkerStats> {
        let start_time = std::time::Instant::now();

        let stats = match worker.start(token).await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Worker failed: {:?}", e);
                return Err(e);
            }
        };

        let total_duration = start_time.elapsed();
        let total = stats.success + stats.failed;
        let rate = if total > 0 {
            (stats.success as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        info!("🛑 Shutdown Complete.");
        info!(
            "Total Time: {:.1}s | Total Success: {} | Total Fail: {} | Success Rate: {:.2}%",
            total_duration.as_secs_f64(),
            stats.success,
            stats.failed,
            rate
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StopsWhenCancelled;

    #[async_trait]
    impl Worker for StopsWhenCancelled {
        async fn start(&self, token: CancellationToken) -> Result<WorkerStats> {
            token.cancelled().await;
            Ok(WorkerStats {
                success: 3,
                failed: 1,
            })
        }
    }

    struct Fails;

    #[async_trait]
    impl Worker for Fails {
        async fn start(&self, _token: CancellationToken) -> Result<WorkerStats> {
            Err(anyhow::anyhow!("boom"))
        }
    }

    #[tokio::test]
    async fn test_run_with_token_returns_stats_after_cancel() {
        let token = CancellationToken::new();
        token.cancel();

        let stats = WorkerRunner::run_with_token(&StopsWhenCancelled, token)
            .await
            .unwrap();
        assert_eq!(stats.success, 3);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_run_with_token_propagates_worker_error() {
        let result = WorkerRunner::run_with_token(&Fails, CancellationToken::new()).await;
        assert!(result.is_err());
    }
}
