//! Cryptographic primitives for the gdprkit core.
//!
//! Provides the three operations everything else is built on:
//! - SHA-256 pseudonymization hashing (deterministic, one-way) so that
//!   identifying values can be looked up by equality without storing
//!   plaintext
//! - ChaCha20-Poly1305 authenticated encryption for the recoverable
//!   originals, with tamper detection on every decrypt
//! - Argon2id password hashing with constant-time verification
//!
//! # Key handling
//!
//! The process-wide data-encryption key is an explicit [`EncryptionKey`]
//! value, constructed once (typically from base64 configuration) and passed
//! to each component at construction time. There is no hidden static key;
//! tests inject their own.

mod cipher;
mod error;
mod hash;
mod key;
mod password;

pub use cipher::{decrypt_string, encrypt_string, MIN_BLOB_LEN, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use hash::hash_string;
pub use key::{EncryptionKey, KEY_SIZE};
pub use password::{hash_password, verify_password, PasswordDigest, SALT_SIZE};
