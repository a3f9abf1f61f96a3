//! Simulated transfer latency.
//!
//! A migration run waits on a [`TransferDelay`] before it touches the
//! destination. The wait is an ordinary future: dropping the `run` future
//! cancels it and the migration ends in `error`.

use async_trait::async_trait;
use std::time::Duration;

/// Latency model for a volume transfer.
///
/// Implementations must not block the executor thread.
#[async_trait]
pub trait TransferDelay: Send + Sync {
    /// Wait for the simulated transfer to complete.
    async fn wait(&self);

    /// Get delay name (for logging).
    fn name(&self) -> &str;
}

/// Sleeps on the tokio timer for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct SleepDelay {
    duration: Duration,
}

impl SleepDelay {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for SleepDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[async_trait]
impl TransferDelay for SleepDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.duration).await;
    }

    fn name(&self) -> &str {
        "sleep"
    }
}

/// Completes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl TransferDelay for NoDelay {
    async fn wait(&self) {}

    fn name(&self) -> &str {
        "none"
    }
}
