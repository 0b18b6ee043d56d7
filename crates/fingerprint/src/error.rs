use thiserror::Error;

/// Errors that can occur while validating fingerprint configuration.
///
/// Extraction itself is infallible; only configuration can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
