//! The audit record and its integrity hash.

use crate::error::AuditResult;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Audit records outlive the data they describe; kept for five years.
const RETENTION_DAYS: i64 = 365 * 5;

/// Who performed an audited action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorType {
    User,
    Admin,
    System,
    Anonymous,
}

/// What kind of action was performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Access,
    Authentication,
    Download,
    ConsentGiven,
    ConsentRevoked,
    DataExported,
    DataErased,
    LoginFailed,
    SessionExpired,
}

/// The entity an audited action targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetEntity {
    Tenant,
    TenantAudience,
    User,
    Consent,
    Session,
    SecurityEvent,
    DataExport,
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for TargetEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One immutable accountability record.
///
/// Created exactly once per operation attempt (including failures); never
/// mutated or deleted by application code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub tenant_id: String,
    /// Identity of the actor; hashed upstream unless the actor is a plain
    /// user context (see [`crate::pseudonymize_performer`]).
    pub performed_by: String,
    pub actor_type: ActorType,
    pub action: AuditAction,
    pub target_entity: TargetEntity,
    pub target_entity_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Hashed client IP, or `None` when not captured.
    pub client_ip: Option<String>,
    pub device_type: Option<String>,
    /// Structured details; a `BTreeMap` keeps serialization canonical so
    /// the integrity hash is reproducible.
    pub details: BTreeMap<String, serde_json::Value>,
    pub is_gdpr_relevant: bool,
    pub retention_expiry: Option<DateTime<Utc>>,
    pub correlation_id: String,
    pub is_success: bool,
    /// Base64 SHA-256 over the canonical concatenation of all other fields.
    pub integrity_hash: Option<String>,
}

impl AuditLog {
    /// Creates an entry with a fresh id, correlation id, current timestamp,
    /// and the standard five-year retention window. The integrity hash is
    /// attached by the ledger on append.
    pub fn new(
        tenant_id: Option<&str>,
        performed_by: String,
        actor_type: ActorType,
        action: AuditAction,
        target_entity: TargetEntity,
        target_entity_id: Option<String>,
        details: BTreeMap<String, serde_json::Value>,
        is_success: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.unwrap_or("Unknown").to_string(),
            performed_by,
            actor_type,
            action,
            target_entity,
            target_entity_id,
            timestamp: now,
            client_ip: None,
            device_type: None,
            details,
            is_gdpr_relevant: true,
            retention_expiry: Some(now + Duration::days(RETENTION_DAYS)),
            correlation_id: Uuid::new_v4().to_string(),
            is_success,
            integrity_hash: None,
        }
    }

    /// Canonical concatenation of every field except the hash itself.
    ///
    /// Timestamps are rendered at second precision; the details map is
    /// serialized as ordered JSON. Any change to a stored field changes
    /// this string and therefore the hash.
    fn canonical_string(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}",
            self.id,
            self.tenant_id,
            self.performed_by,
            self.actor_type,
            self.action,
            self.target_entity,
            self.target_entity_id.as_deref().unwrap_or(""),
            self.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            self.client_ip.as_deref().unwrap_or(""),
            self.device_type.as_deref().unwrap_or(""),
            serde_json::to_string(&self.details).unwrap_or_default(),
            self.is_gdpr_relevant,
            self.retention_expiry
                .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_default(),
            self.correlation_id,
            self.is_success,
        )
    }

    /// Computes the integrity hash from the entry's current fields.
    pub fn compute_integrity_hash(&self) -> AuditResult<String> {
        Ok(gdprkit_crypto::hash_string(&self.canonical_string())?)
    }

    /// Recomputes the hash and compares it with the stored one.
    ///
    /// Returns `false` when the stored hash is absent or does not match,
    /// meaning the record must be treated as tampered.
    pub fn verify_integrity(&self) -> AuditResult<bool> {
        match &self.integrity_hash {
            Some(stored) => Ok(stored == &self.compute_integrity_hash()?),
            None => Ok(false),
        }
    }
}
