//! Tenant-supplied audience data.
//!
//! The caller-facing shape carries plain JSON values; the stored shape
//! carries only ciphertext. Conversion between the two is the audience
//! service's job, so plaintext detail values cannot reach storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arbitrary nested detail fields, keyed by field name.
///
/// `serde_json::Value` is the tagged-union JSON value type
/// (null/bool/number/string/array/object), keeping the encrypt/decrypt and
/// key-normalization logic total. A `BTreeMap` gives deterministic ordering.
pub type AudienceDetails = BTreeMap<String, serde_json::Value>;

/// Audience data as supplied by and returned to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TenantAudience {
    pub id: String,
    pub tenant_id: String,
    pub details: AudienceDetails,
}

/// Audience data as persisted: every detail value is a
/// `nonce ‖ tag ‖ ciphertext` blob over the JSON-serialized original.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedAudienceRecord {
    pub id: String,
    pub tenant_id: String,
    pub details: BTreeMap<String, Vec<u8>>,
}
