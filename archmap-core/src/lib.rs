//! # archmap-core
//!
//! Foundation crate for the archmap architecture scanner.
//! Defines the canonical architecture model, the analyzer exchange types
//! (ScanContext / ScanResult / ScanStatistics), configuration, errors,
//! and scan events. Every other crate in the workspace depends on this.

pub mod collections;
pub mod config;
pub mod errors;
pub mod events;
pub mod model;
pub mod scan;

// Re-export the most commonly used types at the crate root.
pub use config::{ArchmapConfig, ScannerMode};
pub use errors::error_code::ErrorCode;
pub use events::handler::ScanEventHandler;
pub use model::confidence::ConfidenceLevel;
pub use model::ids::component_id;
pub use model::ArchitectureModel;
pub use scan::{ScanContext, ScanResult, ScanStatistics};
