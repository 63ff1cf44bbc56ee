//! # Order Pipeline
//!
//! Processes purchase orders against a product inventory and keeps running
//! statistics, safely under concurrent callers.
//!
//! ## Architecture
//!
//! ```text
//! OrderClient --intake--> OrderProcessor --finished--> StatsWorker x N --deltas--> Reconciler
//!                                                                                      ^
//! StatsClient ------------------------------- snapshot request -----------------------+
//! ```
//!
//! - **Order pipeline** - one [`OrderProcessor`] applies every stock mutation,
//!   fresh orders and reversals alike, strictly in intake order.
//! - **Stats workers** - a fixed pool turns each finished order into a
//!   [`Statistics`] delta.
//! - **Reconciler** - the only owner of the running total; folds deltas and
//!   answers snapshot requests.
//! - **Shutdown** - one [`ShutdownHandle`] stops every task; it is idempotent.
//!
//! ## Example Usage
//!
//! ```no_run
//! # use order_pipeline::{Item, OrderSystem, SystemConfig};
//! # async fn demo(products: Vec<order_pipeline::Product>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SystemConfig::default();
//! let system = OrderSystem::start(&config, products);
//!
//! let _order = system.order_client.create_order(Item::new("p1", 2)).await?;
//! let _stats = system.stats_client.get_stats_within(config.stats_timeout).await?;
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod clients;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod messages;
pub mod pipeline;
pub mod stats;
pub mod store;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, OrderSystem, ShutdownHandle, SystemConfig};
pub use clients::{OrderClient, StatsClient};
pub use domain::{Item, Order, OrderStatus, Product, Statistics};
pub use error::{OrderError, StatsError};
pub use pipeline::OrderProcessor;
