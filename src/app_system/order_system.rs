use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::{ShutdownHandle, SystemConfig};
use crate::clients::{OrderClient, StatsClient};
use crate::domain::Product;
use crate::pipeline::OrderProcessor;
use crate::stats::{Reconciler, StatsWorker};
use crate::store::Stores;

/// Capacity of the snapshot request channel.
const SNAPSHOT_BUFFER: usize = 32;

/// The running order system: pipeline worker, stats pool and reconciler.
///
/// Owns the task handles of every worker it started; [`OrderSystem::shutdown`]
/// is the only way to wait for them.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub stats_client: StatsClient,
    shutdown: ShutdownHandle,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Seeds the stores with `products` and starts every worker.
    ///
    /// **Startup Order:**
    /// 1. Reconciler (no dependencies)
    /// 2. Stats workers, feeding the reconciler
    /// 3. Order processor, feeding the stats workers
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(name = "order_system", skip(config, products))]
    pub fn start(config: &SystemConfig, products: impl IntoIterator<Item = Product>) -> Self {
        info!("Starting order system");

        let stores = Stores::new(products);
        let shutdown = ShutdownHandle::new();
        let mut handles = Vec::with_capacity(config.stats_workers + 2);

        let (processed_tx, processed_rx) = mpsc::channel(config.stats_workers);
        let (deltas_tx, deltas_rx) = mpsc::channel(config.stats_workers);

        let (reconciler, stats_client) =
            Reconciler::new(SNAPSHOT_BUFFER, deltas_rx, shutdown.token());
        handles.push(tokio::spawn(reconciler.run()));

        let processed_rx = Arc::new(Mutex::new(processed_rx));
        for id in 0..config.stats_workers {
            let worker = StatsWorker::new(
                id,
                processed_rx.clone(),
                deltas_tx.clone(),
                shutdown.token(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let (processor, order_client) = OrderProcessor::new(
            config.intake_buffer,
            stores.clone(),
            processed_tx,
            shutdown.token(),
        );
        handles.push(tokio::spawn(processor.run()));

        info!(
            products = stores.products.len(),
            stats_workers = config.stats_workers,
            "Order system started successfully"
        );

        Self {
            order_client,
            stats_client,
            shutdown,
            handles,
        }
    }

    /// Stops every worker. Idempotent; queued orders are dropped.
    pub fn close(&self) -> bool {
        self.shutdown.close()
    }

    /// Clone of the stop signal, for callers that need to close the system
    /// without owning it.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Closes the system and waits for all workers to finish.
    ///
    /// Task failures are logged; the first one is returned after every
    /// handle has been awaited.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down order system");
        self.close();

        let mut result = Ok(());
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Worker task failed");
                if result.is_ok() {
                    result = Err(format!("Worker task failed: {}", e));
                }
            }
        }

        info!("Order system shutdown complete");
        result
    }
}
