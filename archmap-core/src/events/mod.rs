//! Scan progress events.

pub mod handler;
pub mod types;

pub use handler::{NullEventHandler, ScanEventHandler};
pub use types::*;
