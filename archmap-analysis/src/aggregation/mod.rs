//! Aggregation of per-analyzer results into the architecture model.

pub mod aggregator;

pub use aggregator::Aggregator;
