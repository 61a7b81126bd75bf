//! Pseudonymization hashing.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};

/// Returns the base64-encoded SHA-256 digest of the input.
///
/// Deterministic and one-way: the hash replaces an identifying value (email,
/// full name) in storage so equality lookups still work, while the plaintext
/// is only recoverable through its encrypted mapping.
pub fn hash_string(input: &str) -> CryptoResult<String> {
    if input.is_empty() {
        return Err(CryptoError::InvalidArgument(
            "hash input must not be empty".to_string(),
        ));
    }
    let digest = Sha256::digest(input.as_bytes());
    Ok(BASE64.encode(digest))
}
