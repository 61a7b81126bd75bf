//! Service error types.

use thiserror::Error;

/// Result type for tenant data and audience operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the orchestration layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not-found and invalid-state failures, including a missing tenant
    /// and a tenant without data-processing consent.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Client-id mismatch at the authorization gate.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Includes `TamperDetected`; always surfaced, never swallowed.
    #[error("crypto error: {0}")]
    Crypto(#[from] gdprkit_crypto::CryptoError),

    #[error("storage failure: {0}")]
    Storage(#[from] gdprkit_store::StoreError),
}
