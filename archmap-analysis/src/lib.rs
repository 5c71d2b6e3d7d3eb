//! # archmap-analysis
//!
//! Analysis engine for the archmap architecture scanner.
//! Contains the file walker and index, the applicability strategy
//! library, the parser manager, the analyzer kernel with its three-tier
//! parsing fallback, the analyzer plugin set, the pipeline driver, and
//! the aggregator.

pub mod aggregation;
pub mod analyzers;
pub mod kernel;
pub mod parsers;
pub mod pipeline;
pub mod scanner;
pub mod strategies;
