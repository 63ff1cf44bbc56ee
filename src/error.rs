use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::OrderStatus;

/// Errors returned synchronously by order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    Validation(String),
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidState {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("Order pipeline is closed, try again later")]
    Closed,
}

/// Reasons the pipeline rejects an order. These are recorded on the order
/// itself, never returned to the submitting caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProcessingError {
    #[error(transparent)]
    ProductMissing(#[from] StoreError),
    #[error("Not enough stock for product {product_id}: got {available}, want {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },
    #[error("Total for product {product_id} overflows: {amount} x {price}")]
    TotalOverflow {
        product_id: String,
        amount: i64,
        price: Decimal,
    },
    #[error("Stock for product {product_id} would overflow")]
    StockOverflow { product_id: String },
}

/// Errors returned by the statistics reader.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatsError {
    #[error("Statistics deadline exceeded")]
    DeadlineExceeded,
    #[error("Statistics engine is closed")]
    Closed,
}

/// Errors returned by the entity store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("No {kind} found for id {id}")]
    NotFound { kind: &'static str, id: String },
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => OrderError::NotFound(id),
        }
    }
}

/// Errors raised while bootstrapping the inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to read inventory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse inventory: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
