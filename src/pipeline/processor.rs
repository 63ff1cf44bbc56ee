use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::OrderClient;
use crate::domain::{round_money, Order};
use crate::error::ProcessingError;
use crate::store::Stores;

/// Single worker that owns every read-modify-write of product stock.
pub struct OrderProcessor {
    receiver: mpsc::Receiver<Order>,
    stores: Stores,
    processed: mpsc::Sender<Order>,
    shutdown: CancellationToken,
}

impl OrderProcessor {
    /// Builds the processor and the client that feeds its intake.
    ///
    /// Finished orders are forwarded on `processed`.
    pub fn new(
        buffer_size: usize,
        stores: Stores,
        processed: mpsc::Sender<Order>,
        shutdown: CancellationToken,
    ) -> (Self, OrderClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let client = OrderClient::new(sender, stores.clone(), shutdown.clone());
        let processor = Self {
            receiver,
            stores,
            processed,
            shutdown,
        };
        (processor, client)
    }

    /// Main loop. Runs until the shutdown token fires or every client is gone.
    ///
    /// Orders still queued in intake when shutdown fires are dropped.
    #[instrument(name = "order_processor", skip(self))]
    pub async fn run(mut self) {
        info!("OrderProcessor starting");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("OrderProcessor received shutdown signal");
                    break;
                }
                msg = self.receiver.recv() => {
                    let Some(order) = msg else {
                        info!("Intake closed");
                        break;
                    };
                    let Some(order) = self.handle_order(order) else {
                        continue;
                    };
                    if !self.forward(order).await {
                        break;
                    }
                }
            }
        }

        info!("OrderProcessor stopped");
    }

    /// Applies one order to the stores. Returns the finished order, or `None`
    /// when the submission was discarded.
    #[instrument(
        fields(
            order_id = %order.id,
            product_id = %order.item.product_id,
            amount = order.item.amount,
            status = %order.status
        ),
        skip(self, order)
    )]
    fn handle_order(&self, mut order: Order) -> Option<Order> {
        debug!("Processing order");

        // A reversal submitted twice reaches here twice; only the submission
        // matching the persisted status may run.
        match self.stores.orders.find(&order.id) {
            Ok(persisted) if persisted.status == order.status => {}
            Ok(persisted) => {
                warn!(persisted_status = %persisted.status, "Discarding duplicate submission");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Discarding submission for unknown order");
                return None;
            }
        }

        let outcome = match self.apply_stock(&order) {
            Ok(total) => order.complete(total),
            Err(reason) => {
                warn!(reason = %reason, "Order rejected");
                order.reject(reason.to_string())
            }
        };
        if let Err(e) = outcome {
            error!(error = %e, "Illegal status transition");
            return None;
        }

        self.stores.orders.upsert(order.clone());
        info!(status = %order.status, total = ?order.total, "Order processed");
        Some(order)
    }

    /// Moves stock for `order` and returns its total. Reversals credit the
    /// amount back. Nothing is written when the order cannot be served.
    fn apply_stock(&self, order: &Order) -> Result<Decimal, ProcessingError> {
        let amount = if order.is_reversal() {
            -order.item.amount
        } else {
            order.item.amount
        };

        let mut product = self.stores.products.find(&order.item.product_id)?;
        if !product.has_stock_for(amount) {
            return Err(ProcessingError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: amount,
            });
        }

        let total = Decimal::from(order.item.amount)
            .checked_mul(product.price)
            .map(round_money)
            .ok_or_else(|| ProcessingError::TotalOverflow {
                product_id: product.id.clone(),
                amount: order.item.amount,
                price: product.price,
            })?;
        product.stock = product
            .stock
            .checked_sub(amount)
            .ok_or_else(|| ProcessingError::StockOverflow {
                product_id: product.id.clone(),
            })?;
        debug!(remaining_stock = product.stock, "Stock updated");
        self.stores.products.upsert(product);
        Ok(total)
    }

    async fn forward(&self, order: Order) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                info!("OrderProcessor received shutdown signal");
                false
            }
            sent = self.processed.send(order) => {
                if sent.is_err() {
                    error!("Stats engine dropped, stopping");
                }
                sent.is_ok()
            }
        }
    }
}
