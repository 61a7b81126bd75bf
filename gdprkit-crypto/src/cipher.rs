//! Authenticated encryption for recoverable originals.
//!
//! Wire format: `nonce(12) ‖ tag(16) ‖ ciphertext`. The tag sits before the
//! ciphertext so truncation is caught by the length check alone, and any
//! single bit flip anywhere in the blob fails tag verification.

use crate::error::{CryptoError, CryptoResult};
use crate::key::EncryptionKey;
use chacha20poly1305::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce, Tag};

/// Nonce size in bytes (96-bit).
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size in bytes (128-bit).
pub const TAG_SIZE: usize = 16;

/// Smallest blob a decrypt will even look at: nonce + tag, no ciphertext.
pub const MIN_BLOB_LEN: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypts a string, returning `nonce ‖ tag ‖ ciphertext`.
///
/// A fresh random nonce is generated per call, so encrypting the same
/// plaintext twice yields different blobs.
pub fn encrypt_string(key: &EncryptionKey, plaintext: &str) -> CryptoResult<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(CryptoError::InvalidArgument(
            "plaintext must not be empty".to_string(),
        ));
    }

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(format!("aead encrypt failed: {e}")))?;

    let mut blob = Vec::with_capacity(MIN_BLOB_LEN + buffer.len());
    blob.extend_from_slice(nonce.as_slice());
    blob.extend_from_slice(tag.as_slice());
    blob.extend_from_slice(&buffer);
    Ok(blob)
}

/// Decrypts a `nonce ‖ tag ‖ ciphertext` blob produced by [`encrypt_string`].
///
/// Fails with [`CryptoError::TamperDetected`] when the blob is shorter than
/// [`MIN_BLOB_LEN`], the tag does not verify, or the plaintext is not UTF-8.
pub fn decrypt_string(key: &EncryptionKey, blob: &[u8]) -> CryptoResult<String> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(CryptoError::TamperDetected);
    }

    let (nonce, rest) = blob.split_at(NONCE_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| CryptoError::TamperDetected)?;

    String::from_utf8(buffer).map_err(|_| CryptoError::TamperDetected)
}
