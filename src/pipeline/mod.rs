//! The serializing order pipeline.
//!
//! Exactly one [`OrderProcessor`] runs per system. Every stock mutation,
//! fresh or reversal, goes through its intake channel and is applied one
//! order at a time in submission order.

mod processor;

pub use processor::*;
