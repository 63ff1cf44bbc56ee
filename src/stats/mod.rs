//! Statistics engine: a fixed pool of [`StatsWorker`]s turning finished orders
//! into deltas, and one [`Reconciler`] folding them into the running total.

mod reconciler;
mod worker;

pub use reconciler::*;
pub use worker::*;

/// Default size of the stats worker pool.
pub const DEFAULT_WORKER_COUNT: usize = 3;
