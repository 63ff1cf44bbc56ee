use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::domain::Statistics;
use crate::error::StatsError;
use crate::messages::StatsRequest;

/// Reader side of the statistics engine.
#[derive(Clone)]
pub struct StatsClient {
    sender: mpsc::Sender<StatsRequest>,
}

impl StatsClient {
    pub fn new(sender: mpsc::Sender<StatsRequest>) -> Self {
        Self { sender }
    }

    /// Snapshot of the running total, or [`StatsError::DeadlineExceeded`] if
    /// the reconciler does not answer before `deadline`.
    ///
    /// A late snapshot is discarded, never queued for a later call.
    #[instrument(skip(self, deadline))]
    pub async fn get_stats(&self, deadline: Instant) -> Result<Statistics, StatsError> {
        if Instant::now() >= deadline {
            warn!("Deadline already expired");
            return Err(StatsError::DeadlineExceeded);
        }

        tokio::select! {
            biased;
            _ = tokio::time::sleep_until(deadline) => {
                warn!("Statistics deadline exceeded");
                Err(StatsError::DeadlineExceeded)
            }
            snapshot = self.request_snapshot() => snapshot,
        }
    }

    /// [`StatsClient::get_stats`] with a deadline `timeout` from now.
    pub async fn get_stats_within(&self, timeout: Duration) -> Result<Statistics, StatsError> {
        self.get_stats(Instant::now() + timeout).await
    }

    async fn request_snapshot(&self) -> Result<Statistics, StatsError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StatsRequest::GetSnapshot { respond_to })
            .await
            .map_err(|_| StatsError::Closed)?;
        response.await.map_err(|_| StatsError::Closed)
    }

    /// Number of deltas folded so far. Test-only view into reconciler state.
    #[cfg(test)]
    pub async fn delta_count(&self) -> Result<u64, StatsError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StatsRequest::GetDeltaCount { respond_to })
            .await
            .map_err(|_| StatsError::Closed)?;
        response.await.map_err(|_| StatsError::Closed)
    }
}
