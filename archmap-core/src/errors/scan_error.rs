//! Errors raised while walking and reading files.

use std::path::PathBuf;

use super::error_code::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File exceeds size cap ({size} > {limit} bytes): {path}")]
    SizeLimit {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("Walk failed: {message}")]
    Walk { message: String },
}

impl ErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootNotFound { .. } => "SCAN_ROOT_NOT_FOUND",
            Self::Read { .. } => "SCAN_READ_FAILED",
            Self::SizeLimit { .. } => "SCAN_SIZE_LIMIT",
            Self::Walk { .. } => "SCAN_WALK_FAILED",
        }
    }
}
