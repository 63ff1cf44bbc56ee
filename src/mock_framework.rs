//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! The clients only ever talk to channels, so a test can own the receiving
//! half instead of a running worker, inspect what arrives and answer (or not)
//! deterministically.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::clients::{OrderClient, StatsClient};
use crate::domain::{Order, Product, Statistics};
use crate::messages::{ServiceResponse, StatsRequest};
use crate::store::Stores;

/// An [`OrderClient`] wired to an intake the test controls.
pub struct MockOrderClient {
    pub client: OrderClient,
    pub intake: mpsc::Receiver<Order>,
    pub stores: Stores,
    pub shutdown: CancellationToken,
}

pub fn create_mock_order_client(buffer_size: usize, products: Vec<Product>) -> MockOrderClient {
    let (sender, intake) = mpsc::channel(buffer_size);
    let stores = Stores::new(products);
    let shutdown = CancellationToken::new();
    let client = OrderClient::new(sender, stores.clone(), shutdown.clone());
    MockOrderClient {
        client,
        intake,
        stores,
        shutdown,
    }
}

/// Creates a stats client and the receiver its requests land on.
pub fn create_mock_stats_client(buffer_size: usize) -> (StatsClient, mpsc::Receiver<StatsRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StatsClient::new(sender), receiver)
}

/// Next order handed to the intake
pub async fn expect_intake(receiver: &mut mpsc::Receiver<Order>) -> Option<Order> {
    receiver.recv().await
}

/// Helper to verify that the next message is a snapshot request
pub async fn expect_snapshot_request(
    receiver: &mut mpsc::Receiver<StatsRequest>,
) -> Option<ServiceResponse<Statistics>> {
    match receiver.recv().await {
        Some(StatsRequest::GetSnapshot { respond_to }) => Some(respond_to),
        _ => None,
    }
}
