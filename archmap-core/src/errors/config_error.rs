//! Configuration errors — the only fatal class.

use std::path::PathBuf;

use super::error_code::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Repository path does not exist: {path}")]
    MissingRepository { path: PathBuf },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "CONFIG_READ_FAILED",
            Self::Invalid { .. } => "CONFIG_INVALID",
            Self::MissingRepository { .. } => "CONFIG_MISSING_REPOSITORY",
        }
    }
}
