use crate::error::NetworkError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace, warn};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Backoff(Duration),
    FailFast,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Wait after an HTTP 500.
    pub server_error_backoff: Duration,
    /// Wait after any other failure.
    pub default_backoff: Duration,
    /// Give up immediately on 4xx (except 408 and 429) instead of retrying.
    pub fail_fast_on_client_error: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            server_error_backoff: Duration::from_secs(2),
            default_backoff: Duration::from_secs(2),
            fail_fast_on_client_error: false,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, server_error_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            server_error_backoff,
            ..Default::default()
        }
    }

    pub fn with_default_backoff(mut self, backoff: Duration) -> Self {
        self.default_backoff = backoff;
        self
    }

    pub fn with_fail_fast_on_client_error(mut self, fail_fast: bool) -> Self {
        self.fail_fast_on_client_error = fail_fast;
        self
    }

    pub fn classify(&self, error: &NetworkError) -> RetryDecision {
        match error.status_code() {
            Some(500) => RetryDecision::Backoff(self.server_error_backoff),
            Some(code)
                if self.fail_fast_on_client_error
                    && (400..500).contains(&code)
                    && code != 408
                    && code != 429 =>
            {
                RetryDecision::FailFast
            }
            _ => RetryDecision::Backoff(self.default_backoff),
        }
    }
}

/// Runs `operation` until it succeeds, the attempts run out, the classifier
/// says to stop, or `cancel` fires. No attempt starts once `cancel` is set.
///
/// Failures never escape: an exhausted or abandoned operation yields `None`.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    cancel: &CancellationToken,
    mut operation: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NetworkError>>,
{
    let max_attempts = config.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            warn!("{} cancelled before attempt {}", operation_name, attempt);
            return None;
        }
        trace!("Attempt {}/{}: {}", attempt, max_attempts, operation_name);

        let e = match operation().await {
            Ok(result) => return Some(result),
            Err(e) => e,
        };

        if attempt == max_attempts {
            error!(
                error = %e.detail(),
                "Request failed after multiple attempts"
            );
            return None;
        }

        let delay = match config.classify(&e) {
            RetryDecision::FailFast => {
                error!(error = %e.detail(), "Request failed permanently, not retrying");
                return None;
            }
            RetryDecision::Backoff(delay) => delay,
        };

        if e.status_code() == Some(500) {
            warn!(
                "Server error (500), retrying in {}s",
                delay.as_secs_f64()
            );
        } else {
            warn!(
                error = %e.detail(),
                "Request failed, retrying in {}s",
                delay.as_secs_f64()
            );
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                warn!("{} cancelled during backoff", operation_name);
                return None;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    None
}
