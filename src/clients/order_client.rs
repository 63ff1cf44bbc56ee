use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::{Item, Order, OrderStatus, Product};
use crate::error::OrderError;
use crate::store::Stores;

/// Client for the order pipeline.
///
/// Validation and lookups happen here, on the caller's task. Anything that
/// mutates stock is handed to the pipeline's intake and happens later.
#[derive(Clone)]
pub struct OrderClient {
    intake: mpsc::Sender<Order>,
    stores: Stores,
    shutdown: CancellationToken,
}

impl OrderClient {
    pub fn new(intake: mpsc::Sender<Order>, stores: Stores, shutdown: CancellationToken) -> Self {
        Self {
            intake,
            stores,
            shutdown,
        }
    }

    /// Validates `item`, records a pending order and queues it for processing.
    ///
    /// Returns as soon as the pipeline has accepted the order; the outcome is
    /// visible later through [`OrderClient::get_order`].
    #[instrument(fields(product_id = %item.product_id, amount = item.amount), skip(self, item))]
    pub async fn create_order(&self, item: Item) -> Result<Order, OrderError> {
        debug!("Processing create_order request");

        self.validate_item(&item)?;
        if self.shutdown.is_cancelled() {
            return Err(OrderError::Closed);
        }

        let mut order = Order::new(item);
        order.transition(OrderStatus::Pending)?;
        self.stores.orders.upsert(order.clone());

        if let Err(e) = self.submit(order.clone()).await {
            warn!(order_id = %order.id, "Intake closed, order not accepted");
            let mut rejected = order;
            rejected.reject(e.to_string())?;
            self.stores.orders.upsert(rejected);
            return Err(e);
        }

        info!(order_id = %order.id, "Order accepted");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub fn get_order(&self, id: &str) -> Result<Order, OrderError> {
        debug!("Processing get_order request");
        Ok(self.stores.orders.find(&id.to_string())?)
    }

    /// Queues a completed order for reversal through the same intake as
    /// fresh orders.
    #[instrument(skip(self))]
    pub async fn request_reversal(&self, id: &str) -> Result<Order, OrderError> {
        debug!("Processing request_reversal request");

        let id = id.to_string();
        let original = self.stores.orders.find(&id)?;
        if let Err(e) = original.clone().transition(OrderStatus::ReversalRequested) {
            warn!(status = %original.status, "Only completed orders can be reversed");
            return Err(e);
        }
        if self.shutdown.is_cancelled() {
            return Err(OrderError::Closed);
        }

        // Concurrent requests for the same order race here; only one wins.
        let order = self
            .stores
            .orders
            .update(&id, |order| order.transition(OrderStatus::ReversalRequested))?;
        if let Err(e) = self.submit(order.clone()).await {
            warn!("Intake closed, restoring completed order");
            self.stores.orders.upsert(original);
            return Err(e);
        }

        info!("Reversal accepted");
        Ok(order)
    }

    /// Every product, ordered by id.
    pub fn get_all_products(&self) -> Vec<Product> {
        self.stores.products.find_all()
    }

    fn validate_item(&self, item: &Item) -> Result<(), OrderError> {
        if item.amount < 1 {
            warn!("Validation failed: amount below 1");
            return Err(OrderError::Validation(format!(
                "order amount must be at least 1: got {}",
                item.amount
            )));
        }
        if !self.stores.products.exists(&item.product_id) {
            warn!("Validation failed: unknown product");
            return Err(OrderError::Validation(format!(
                "product {} does not exist",
                item.product_id
            )));
        }
        Ok(())
    }

    /// Hands `order` to the intake unless shutdown wins the race.
    async fn submit(&self, order: Order) -> Result<(), OrderError> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(OrderError::Closed),
            sent = self.intake.send(order) => sent.map_err(|_| OrderError::Closed),
        }
    }
}
