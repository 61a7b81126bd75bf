//! Pseudonym mappings: hashed value → encrypted original.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which tenant field a mapping covers.
///
/// Exactly one live mapping exists per (tenant, field kind); replacing a
/// field's value upserts its mapping rather than inserting a second one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    FullName,
    Email,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::FullName => "FullName",
            FieldKind::Email => "Email",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlates one hashed field value with its encrypted original.
///
/// `encrypted_original` is a `nonce ‖ tag ‖ ciphertext` blob; recovering
/// the plaintext goes through authenticated decryption, never by reversing
/// `hashed_value`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PseudonymMapping {
    pub id: String,
    pub tenant_id: String,
    pub hashed_value: String,
    pub encrypted_original: Vec<u8>,
    pub field_kind: FieldKind,
    pub retention_expiry: Option<DateTime<Utc>>,
}
