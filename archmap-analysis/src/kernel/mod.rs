//! Shared analyzer behavior: capped file reads, the per-file pre-filter,
//! and the three-tier parsing fallback with statistics.

pub mod findings;
pub mod kernel;
pub mod prefilter;

pub use findings::Findings;
pub use kernel::{AnalyzerKernel, AnalyzerServices};
pub use prefilter::{NameDecision, PreFilter};
