use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub success: u64,
    pub failed: u64,
}

/// A long-running job driven by [`crate::WorkerRunner`].
#[async_trait]
pub trait Worker: Send + Sync {
    /// Runs until finished or until `cancellation_token` fires.
    async fn start(&self, cancellation_token: CancellationToken) -> Result<WorkerStats>;
}
