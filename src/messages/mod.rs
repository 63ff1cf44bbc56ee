use tokio::sync::oneshot;

use crate::domain::Statistics;

/// Response half of a request, answered exactly once by the owning task.
pub type ServiceResponse<T> = oneshot::Sender<T>;

/// Requests answered by the reconciler. Each request carries its own
/// oneshot channel, so concurrent readers never share a response.
#[derive(Debug)]
pub enum StatsRequest {
    GetSnapshot {
        respond_to: ServiceResponse<Statistics>,
    },
    #[cfg(test)]
    GetDeltaCount {
        respond_to: ServiceResponse<u64>,
    },
}
