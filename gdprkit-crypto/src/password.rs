//! Password hashing with Argon2id.
//!
//! Passwords are never stored or recoverable; only the salted Argon2id
//! output is kept. Verification recomputes the digest and compares in
//! constant time so it leaks nothing about the stored value.

use crate::error::{CryptoError, CryptoResult};
use argon2::Argon2;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Salt size in bytes.
pub const SALT_SIZE: usize = 16;

/// Argon2id output size in bytes.
const DIGEST_SIZE: usize = 32;

/// A salted password digest as stored on the tenant record.
#[derive(Clone, Debug)]
pub struct PasswordDigest {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Derives a salted Argon2id digest from a password.
pub fn hash_password(password: &str) -> CryptoResult<PasswordDigest> {
    if password.is_empty() {
        return Err(CryptoError::InvalidArgument(
            "password must not be empty".to_string(),
        ));
    }

    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let mut hash = [0u8; DIGEST_SIZE];
    Argon2::default()
        .hash_password_into(password.as_bytes(), &salt, &mut hash)
        .map_err(|e| CryptoError::KeyDerivation(format!("argon2 failed: {e}")))?;

    Ok(PasswordDigest {
        hash: hash.to_vec(),
        salt: salt.to_vec(),
    })
}

/// Verifies a password against a stored digest in constant time.
pub fn verify_password(password: &str, hash: &[u8], salt: &[u8]) -> CryptoResult<bool> {
    if password.is_empty() {
        return Err(CryptoError::InvalidArgument(
            "password must not be empty".to_string(),
        ));
    }

    let mut candidate = [0u8; DIGEST_SIZE];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut candidate)
        .map_err(|e| CryptoError::KeyDerivation(format!("argon2 failed: {e}")))?;

    Ok(candidate.ct_eq(hash).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let digest = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &digest.hash, &digest.salt).unwrap());
    }

    #[test]
    fn wrong_password_fails() {
        let digest = hash_password("s3cret!").unwrap();
        assert!(!verify_password("not it", &digest.hash, &digest.salt).unwrap());
    }

    #[test]
    fn salt_makes_digests_unique() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a.hash, b.hash);
    }
}
