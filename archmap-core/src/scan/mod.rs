//! Analyzer exchange types: what goes into a scan and what comes out.

pub mod context;
pub mod files;
pub mod result;
pub mod statistics;

pub use context::ScanContext;
pub use files::{DiscoveredFile, FileSet};
pub use result::{ScanResult, ScanResultBuilder};
pub use statistics::{ErrorKind, ScanStatistics};
