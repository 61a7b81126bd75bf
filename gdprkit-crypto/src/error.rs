//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in crypto operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Authentication-tag verification failed, the blob is truncated, or
    /// the decrypted bytes are not valid UTF-8. Tampered ciphertext is
    /// never silently returned as plaintext.
    #[error("decryption failed: data may have been tampered with")]
    TamperDetected,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}
