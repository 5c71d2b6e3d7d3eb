//! Stable machine-readable error codes.

/// Every error enum exposes a stable code for logs and tooling.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
