//! Cheap, cloneable handles that callers use to talk to the pipeline and the
//! statistics engine.

mod order_client;
mod stats_client;

pub use order_client::*;
pub use stats_client::*;
