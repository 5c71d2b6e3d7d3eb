//! Errors raised by structured (tier-1) parsers.
//!
//! These never escape an analyzer: the kernel converts them into tier
//! transitions and statistics entries.

use std::path::PathBuf;

use super::error_code::ErrorCode;
use crate::scan::statistics::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No grammar registered for language '{language}'")]
    GrammarNotFound { language: String },

    #[error("Parse failed for {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("Unsupported construct in {path}: {message}")]
    Unsupported { path: PathBuf, message: String },

    #[error("Malformed document {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl ParseError {
    /// The statistics bucket a tier-3 failure with this error lands in.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::GrammarNotFound { .. } | Self::Unsupported { .. } => {
                ErrorKind::UnsupportedFeature
            }
            Self::Syntax { .. } | Self::Malformed { .. } => ErrorKind::Parse,
        }
    }
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::GrammarNotFound { .. } => "PARSE_GRAMMAR_NOT_FOUND",
            Self::Syntax { .. } => "PARSE_SYNTAX",
            Self::Unsupported { .. } => "PARSE_UNSUPPORTED",
            Self::Malformed { .. } => "PARSE_MALFORMED",
        }
    }
}
