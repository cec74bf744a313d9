//! Shutdown coordination.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Broadcast coordinator for graceful shutdown.
///
/// Long-running tasks hold a receiver from `subscribe`; `trigger` wakes all of
/// them at once.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    drain_timeout: Duration,
}

impl Shutdown {
    pub fn new(drain_timeout: Duration) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx, drain_timeout }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        tracing::info!(subscribers = self.tx.receiver_count(), "Shutdown triggered");
        let _ = self.tx.send(());
    }

    /// Wait for `task` to finish, giving up after the drain deadline.
    /// Returns `None` if the deadline passed or the task panicked.
    pub async fn drain<T>(&self, task: JoinHandle<T>) -> Option<T> {
        match tokio::time::timeout(self.drain_timeout, task).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Task failed during shutdown");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.drain_timeout.as_millis() as u64,
                    "Drain deadline passed"
                );
                None
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
