use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::domain::{Order, OrderStatus, Statistics};

/// Finished-orders channel shared by every worker in the pool.
pub type SharedOrderReceiver = Arc<Mutex<mpsc::Receiver<Order>>>;

/// Statistics effect of a single finished order.
pub fn delta_for(order: &Order) -> Statistics {
    let total = order.total.unwrap_or_default();
    match order.status {
        OrderStatus::Completed => Statistics {
            completed_orders: 1,
            revenue: total,
            ..Statistics::default()
        },
        OrderStatus::Reversed => Statistics {
            reversed_orders: 1,
            revenue: -total,
            ..Statistics::default()
        },
        _ => Statistics {
            rejected_orders: 1,
            ..Statistics::default()
        },
    }
}

/// Stateless worker: takes finished orders, emits deltas.
pub struct StatsWorker {
    id: usize,
    orders: SharedOrderReceiver,
    deltas: mpsc::Sender<Statistics>,
    shutdown: CancellationToken,
}

impl StatsWorker {
    pub fn new(
        id: usize,
        orders: SharedOrderReceiver,
        deltas: mpsc::Sender<Statistics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            orders,
            deltas,
            shutdown,
        }
    }

    #[instrument(name = "stats_worker", fields(worker_id = self.id), skip(self))]
    pub async fn run(self) {
        info!("StatsWorker starting");

        loop {
            let order = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("StatsWorker received shutdown signal");
                    break;
                }
                order = self.next_order() => order,
            };
            let Some(order) = order else {
                info!("Finished-orders channel closed");
                break;
            };

            let delta = delta_for(&order);
            debug!(order_id = %order.id, status = %order.status, "Computed delta");

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("StatsWorker received shutdown signal");
                    break;
                }
                sent = self.deltas.send(delta) => {
                    if sent.is_err() {
                        info!("Reconciler gone");
                        break;
                    }
                }
            }
        }

        info!("StatsWorker stopped");
    }

    async fn next_order(&self) -> Option<Order> {
        self.orders.lock().await.recv().await
    }
}
