//! Encrypted tenant audience details.

use crate::error::{ServiceError, ServiceResult};
use crate::gate::{action_details, authorize_tenant, error_details};
use gdprkit_audit::{ActorType, AuditAction, AuditLedger, AuditLog, TargetEntity};
use gdprkit_crypto::{decrypt_string, encrypt_string, EncryptionKey};
use gdprkit_model::{AudienceDetails, EncryptedAudienceRecord, TenantAudience};
use gdprkit_store::{AudienceStore, TenantStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Stores and recovers tenant-supplied audience data.
///
/// Each detail value is JSON-serialized and encrypted individually before
/// it reaches storage, so the stored record contains field names and
/// ciphertext only. Reads decrypt every value and normalize object keys to
/// camelCase.
pub struct AudienceService {
    tenants: Arc<dyn TenantStore>,
    audiences: Arc<dyn AudienceStore>,
    ledger: AuditLedger,
    key: EncryptionKey,
}

impl AudienceService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        audiences: Arc<dyn AudienceStore>,
        ledger: AuditLedger,
        key: EncryptionKey,
    ) -> Self {
        Self {
            tenants,
            audiences,
            ledger,
            key,
        }
    }

    /// Encrypts and stores one audience record; returns its id.
    ///
    /// A caller-supplied id is kept, an empty one is replaced with a fresh
    /// uuid.
    pub async fn save_audience(
        &self,
        audience: TenantAudience,
        client_id: &str,
    ) -> ServiceResult<String> {
        let tenant = authorize_tenant(
            &self.tenants,
            &self.ledger,
            &audience.tenant_id,
            client_id,
            AuditAction::Create,
        )
        .await?;

        let mut encrypted = BTreeMap::new();
        for (field, value) in &audience.details {
            let json = serde_json::to_string(value).map_err(|e| {
                ServiceError::InvalidOperation(format!(
                    "failed to serialize audience field '{field}': {e}"
                ))
            })?;
            encrypted.insert(field.clone(), encrypt_string(&self.key, &json)?);
        }

        let record = EncryptedAudienceRecord {
            id: if audience.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                audience.id
            },
            tenant_id: audience.tenant_id.clone(),
            details: encrypted,
        };
        let record_id = record.id.clone();

        if let Err(e) = self.audiences.insert_audience(record).await {
            self.ledger
                .record(AuditLog::new(
                    Some(&audience.tenant_id),
                    "System".to_string(),
                    ActorType::System,
                    AuditAction::Create,
                    TargetEntity::TenantAudience,
                    Some(record_id.clone()),
                    error_details(&format!("failed to save audience data: {e}")),
                    false,
                ))
                .await;
            error!(tenant_id = %audience.tenant_id, "failed to save audience data");
            return Err(e.into());
        }

        self.ledger
            .record(AuditLog::new(
                Some(&audience.tenant_id),
                tenant.email.clone(),
                ActorType::User,
                AuditAction::Create,
                TargetEntity::TenantAudience,
                Some(record_id.clone()),
                action_details("Tenant audience data saved"),
                true,
            ))
            .await;
        info!(tenant_id = %audience.tenant_id, audience_id = %record_id, "audience data saved");

        Ok(record_id)
    }

    /// Returns all audience records for a tenant with every detail value
    /// decrypted and object keys normalized to camelCase.
    pub async fn get_audiences(
        &self,
        tenant_id: &str,
        client_id: &str,
    ) -> ServiceResult<Vec<TenantAudience>> {
        let tenant = authorize_tenant(
            &self.tenants,
            &self.ledger,
            tenant_id,
            client_id,
            AuditAction::Access,
        )
        .await?;

        let records = self.audiences.audiences_for_tenant(tenant_id).await?;
        let mut audiences = Vec::with_capacity(records.len());
        for record in records {
            let mut details = AudienceDetails::new();
            for (field, blob) in &record.details {
                let json = match decrypt_string(&self.key, blob) {
                    Ok(json) => json,
                    Err(e) => {
                        self.ledger
                            .record(AuditLog::new(
                                Some(tenant_id),
                                "System".to_string(),
                                ActorType::System,
                                AuditAction::Access,
                                TargetEntity::TenantAudience,
                                Some(record.id.clone()),
                                error_details(&format!(
                                    "failed to decrypt audience field '{field}'"
                                )),
                                false,
                            ))
                            .await;
                        error!(%tenant_id, %field, "audience field decryption failed");
                        return Err(e.into());
                    }
                };
                let value: serde_json::Value = serde_json::from_str(&json).map_err(|e| {
                    ServiceError::InvalidOperation(format!(
                        "failed to deserialize audience field '{field}': {e}"
                    ))
                })?;
                details.insert(to_camel_case(field), normalize_keys(value));
            }
            audiences.push(TenantAudience {
                id: record.id,
                tenant_id: record.tenant_id,
                details,
            });
        }

        self.ledger
            .record(AuditLog::new(
                Some(tenant_id),
                tenant.email.clone(),
                ActorType::User,
                AuditAction::Access,
                TargetEntity::TenantAudience,
                Some(tenant_id.to_string()),
                action_details(&format!(
                    "Retrieved {} tenant audience records with decryption",
                    audiences.len()
                )),
                true,
            ))
            .await;
        info!(%tenant_id, count = audiences.len(), "audience data retrieved");

        Ok(audiences)
    }
}

/// Lowercases the first character; everything else is left alone.
fn to_camel_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            first.to_lowercase().collect::<String>() + chars.as_str()
        }
        _ => input.to_string(),
    }
}

/// Recursively rewrites object keys to camelCase.
fn normalize_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(key, value)| (to_camel_case(&key), normalize_keys(value)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(normalize_keys).collect())
        }
        other => other,
    }
}
