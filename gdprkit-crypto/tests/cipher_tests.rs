//! Adversarial tests for the authenticated-encryption contract.
//!
//! The central property: any single bit flip anywhere in a blob must be
//! detected before plaintext is returned.

use gdprkit_crypto::{
    decrypt_string, encrypt_string, hash_string, CryptoError, EncryptionKey, MIN_BLOB_LEN,
    NONCE_SIZE, TAG_SIZE,
};
use proptest::prelude::*;

// ── Round Trip ──

#[test]
fn encrypt_decrypt_round_trip() {
    let key = EncryptionKey::generate();
    let blob = encrypt_string(&key, "a@b.com").unwrap();
    assert_eq!(decrypt_string(&key, &blob).unwrap(), "a@b.com");
}

#[test]
fn blob_layout_is_nonce_tag_ciphertext() {
    let key = EncryptionKey::generate();
    let blob = encrypt_string(&key, "Jane Doe").unwrap();
    assert_eq!(blob.len(), NONCE_SIZE + TAG_SIZE + "Jane Doe".len());
    assert!(blob.len() >= MIN_BLOB_LEN);
}

#[test]
fn unicode_round_trip() {
    let key = EncryptionKey::generate();
    let blob = encrypt_string(&key, "Ægir Ñoño 北京").unwrap();
    assert_eq!(decrypt_string(&key, &blob).unwrap(), "Ægir Ñoño 北京");
}

// ── Tamper Detection ──

#[test]
fn wrong_key_is_tamper() {
    let blob = encrypt_string(&EncryptionKey::generate(), "a@b.com").unwrap();
    assert!(matches!(
        decrypt_string(&EncryptionKey::generate(), &blob),
        Err(CryptoError::TamperDetected)
    ));
}

#[test]
fn every_single_bit_flip_is_detected() {
    let key = EncryptionKey::generate();
    let blob = encrypt_string(&key, "flip me").unwrap();

    for byte in 0..blob.len() {
        for bit in 0..8 {
            let mut tampered = blob.clone();
            tampered[byte] ^= 1 << bit;
            assert!(
                matches!(
                    decrypt_string(&key, &tampered),
                    Err(CryptoError::TamperDetected)
                ),
                "flip at byte {byte} bit {bit} was not detected"
            );
        }
    }
}

#[test]
fn truncated_blob_is_tamper() {
    let key = EncryptionKey::generate();
    let blob = encrypt_string(&key, "short").unwrap();
    for len in 0..MIN_BLOB_LEN {
        assert!(matches!(
            decrypt_string(&key, &blob[..len]),
            Err(CryptoError::TamperDetected)
        ));
    }
}

// ── Key Material ──

#[test]
fn key_from_slice_rejects_bad_length() {
    assert!(matches!(
        EncryptionKey::from_slice(&[0u8; 31]),
        Err(CryptoError::InvalidKeyLength {
            expected: 32,
            actual: 31
        })
    ));
}

#[test]
fn key_round_trips_through_base64() {
    // The config-style key path: base64 in, working key out.
    let encoded = "ASNFZ4mrze/+3LqYdlQyEBEiM0RVV2aHiZqrzN3u/wA=";
    let key = EncryptionKey::from_base64(encoded).unwrap();
    let blob = encrypt_string(&key, "config key").unwrap();
    assert_eq!(decrypt_string(&key, &blob).unwrap(), "config key");
}

#[test]
fn key_from_base64_rejects_garbage() {
    assert!(EncryptionKey::from_base64("not base64 !!!").is_err());
    // Valid base64, wrong decoded length.
    assert!(matches!(
        EncryptionKey::from_base64("c2hvcnQ="),
        Err(CryptoError::InvalidKeyLength { .. })
    ));
}

// ── Properties ──

proptest! {
    #[test]
    fn round_trip_any_plaintext(plaintext in ".{1,256}") {
        let key = EncryptionKey::generate();
        let blob = encrypt_string(&key, &plaintext).unwrap();
        prop_assert_eq!(decrypt_string(&key, &blob).unwrap(), plaintext);
    }

    #[test]
    fn random_bit_flip_fails(plaintext in ".{1,64}", byte_seed: usize, bit in 0usize..8) {
        let key = EncryptionKey::generate();
        let mut blob = encrypt_string(&key, &plaintext).unwrap();
        let byte = byte_seed % blob.len();
        blob[byte] ^= 1 << bit;
        prop_assert!(matches!(
            decrypt_string(&key, &blob),
            Err(CryptoError::TamperDetected)
        ));
    }

    #[test]
    fn hash_is_deterministic(input in ".{1,128}") {
        prop_assert_eq!(hash_string(&input).unwrap(), hash_string(&input).unwrap());
    }
}
