//! Auth error types.

use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur in the credential and token lifecycle.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not-found and invalid-state failures (absent tenant or mapping,
    /// invalid credentials). Surfaced to the caller, never retried.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Client-id mismatch or an invalid, expired, or revoked refresh
    /// token. Never retried automatically.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Includes `TamperDetected`, which is always surfaced: silently
    /// accepting tampered ciphertext would defeat the integrity guarantee.
    #[error("crypto error: {0}")]
    Crypto(#[from] gdprkit_crypto::CryptoError),

    #[error("storage failure: {0}")]
    Storage(#[from] gdprkit_store::StoreError),

    #[error("token error: {0}")]
    Token(String),
}
