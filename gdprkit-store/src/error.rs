//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage operation failed: {0}")]
    Storage(String),
}
