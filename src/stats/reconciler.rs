use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::clients::StatsClient;
use crate::domain::Statistics;
use crate::messages::{ServiceResponse, StatsRequest};

enum Input {
    Delta(Statistics),
    Request(StatsRequest),
}

/// Next delta or request, whichever is ready. Neither channel can starve the
/// other. `None` once both channels are closed.
async fn next_input(
    deltas: &mut mpsc::Receiver<Statistics>,
    requests: &mut mpsc::Receiver<StatsRequest>,
) -> Option<Input> {
    tokio::select! {
        Some(delta) = deltas.recv() => Some(Input::Delta(delta)),
        Some(request) = requests.recv() => Some(Input::Request(request)),
        else => None,
    }
}

/// Sole owner of the running statistics total.
///
/// Deltas are folded in arrival order; snapshot requests are answered with a
/// copy of the total as it stands when the request is handled.
pub struct Reconciler {
    deltas: mpsc::Receiver<Statistics>,
    requests: mpsc::Receiver<StatsRequest>,
    total: Statistics,
    folded: u64,
    shutdown: CancellationToken,
}

impl Reconciler {
    pub fn new(
        buffer_size: usize,
        deltas: mpsc::Receiver<Statistics>,
        shutdown: CancellationToken,
    ) -> (Self, StatsClient) {
        let (sender, requests) = mpsc::channel(buffer_size);
        let reconciler = Self {
            deltas,
            requests,
            total: Statistics::default(),
            folded: 0,
            shutdown,
        };
        (reconciler, StatsClient::new(sender))
    }

    #[instrument(name = "reconciler", skip(self))]
    pub async fn run(mut self) {
        info!("Reconciler starting");

        loop {
            let input = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Reconciler received shutdown signal");
                    break;
                }
                input = next_input(&mut self.deltas, &mut self.requests) => input,
            };
            match input {
                Some(Input::Delta(delta)) => self.handle_delta(delta),
                Some(Input::Request(request)) => self.handle_request(request),
                None => {
                    info!("All inputs closed");
                    break;
                }
            }
        }

        info!(
            completed = self.total.completed_orders,
            rejected = self.total.rejected_orders,
            reversed = self.total.reversed_orders,
            revenue = %self.total.revenue,
            "Reconciler stopped"
        );
    }

    fn handle_delta(&mut self, delta: Statistics) {
        self.total = self.total.combine(delta);
        self.folded += 1;
        debug!(revenue = %self.total.revenue, folded = self.folded, "Delta folded");
    }

    fn handle_request(&self, request: StatsRequest) {
        match request {
            StatsRequest::GetSnapshot { respond_to } => self.handle_get_snapshot(respond_to),
            #[cfg(test)]
            StatsRequest::GetDeltaCount { respond_to } => {
                let _ = respond_to.send(self.folded);
            }
        }
    }

    fn handle_get_snapshot(&self, respond_to: ServiceResponse<Statistics>) {
        debug!("Processing get_snapshot request");
        // The reader may have given up already; the snapshot is then discarded.
        if respond_to.send(self.total).is_err() {
            debug!("Snapshot requester went away");
        }
    }
}
