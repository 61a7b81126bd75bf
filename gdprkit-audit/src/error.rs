//! Audit ledger error types.

use thiserror::Error;

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Errors that can occur while appending to the ledger.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid audit entry: {0}")]
    InvalidEntry(String),

    #[error("an audit log with id {0} already exists")]
    DuplicateId(String),

    #[error("audit storage failed: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] gdprkit_crypto::CryptoError),
}
