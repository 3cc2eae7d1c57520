use thiserror::Error;

/// Errors surfaced across the PHAMT/THAMT public API.
///
/// All three variants reflect a caller contract violation or a genuine
/// key absence; none are retryable and none are ever recovered from
/// inside the crate.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PhamtError {
    #[error("key not found")]
    KeyNotFound,
    #[error("key outside the representable [KEY_MIN, KEY_MAX] domain")]
    KeyDomainError,
    #[error("transient used after persistent() was called")]
    TransientUsed,
}

pub type Result<T> = std::result::Result<T, PhamtError>;
