//! Tenant data reads, updates, and export.

use crate::error::{ServiceError, ServiceResult};
use crate::gate::{action_details, authorize_tenant, error_details};
use chrono::Utc;
use gdprkit_audit::{ActorType, AuditAction, AuditLedger, AuditLog, TargetEntity};
use gdprkit_crypto::{decrypt_string, encrypt_string, hash_string, EncryptionKey};
use gdprkit_model::{
    FieldKind, PseudonymMapping, Tenant, TenantProfile, UpdateTenantRequest,
};
use gdprkit_store::{MappingStore, TenantStore, TenantUpdate};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Output formats for a tenant data export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if s.eq_ignore_ascii_case("csv") {
            Ok(Self::Csv)
        } else {
            Err(ServiceError::InvalidArgument(
                "format must be 'JSON' or 'CSV'".to_string(),
            ))
        }
    }
}

/// Orchestrates authorized access to tenant records.
///
/// Reads recover the plaintext originals from the pseudonym mappings;
/// updates that replace the full name re-hash the stored value and upsert
/// its mapping in the same operation.
pub struct TenantService {
    tenants: Arc<dyn TenantStore>,
    mappings: Arc<dyn MappingStore>,
    ledger: AuditLedger,
    key: EncryptionKey,
}

impl TenantService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        mappings: Arc<dyn MappingStore>,
        ledger: AuditLedger,
        key: EncryptionKey,
    ) -> Self {
        Self {
            tenants,
            mappings,
            ledger,
            key,
        }
    }

    /// Returns the tenant's profile with originals recovered from the
    /// mapping store. A field whose mapping is absent falls back to the
    /// stored hash; a mapping that fails to decrypt is surfaced as a
    /// crypto error, never silently skipped.
    pub async fn get_tenant_data(
        &self,
        tenant_id: &str,
        client_id: &str,
    ) -> ServiceResult<TenantProfile> {
        let tenant = authorize_tenant(
            &self.tenants,
            &self.ledger,
            tenant_id,
            client_id,
            AuditAction::Access,
        )
        .await?;

        let (full_name, email) = self.recover_pii(&tenant).await?;
        let profile = build_profile(&tenant, full_name, email);

        self.audit_success(
            tenant_id,
            &tenant.email,
            AuditAction::Access,
            "Tenant data accessed successfully",
        )
        .await;
        info!(%tenant_id, "tenant data accessed");

        Ok(profile)
    }

    /// Applies a partial update. Replacing the full name re-hashes the
    /// stored value and replaces its pseudonym mapping atomically with
    /// respect to other replacements for the same (tenant, field kind).
    pub async fn update_tenant(
        &self,
        tenant_id: &str,
        request: UpdateTenantRequest,
        client_id: &str,
    ) -> ServiceResult<()> {
        let tenant = authorize_tenant(
            &self.tenants,
            &self.ledger,
            tenant_id,
            client_id,
            AuditAction::Update,
        )
        .await?;

        let mut full_name_hash = None;
        if let Some(new_full_name) = request.full_name.as_deref() {
            if new_full_name.is_empty() {
                self.audit_failure(
                    tenant_id,
                    "System",
                    AuditAction::Update,
                    "update rejected: replacement full name is empty",
                )
                .await;
                return Err(ServiceError::InvalidArgument(
                    "full name must not be empty".to_string(),
                ));
            }
            let hashed = hash_string(new_full_name)?;
            self.mappings.ensure_mapping_index().await?;
            self.mappings
                .upsert_mapping(PseudonymMapping {
                    id: Uuid::new_v4().to_string(),
                    tenant_id: tenant_id.to_string(),
                    hashed_value: hashed.clone(),
                    encrypted_original: encrypt_string(&self.key, new_full_name)?,
                    field_kind: FieldKind::FullName,
                    retention_expiry: tenant.retention_expiry,
                })
                .await?;
            full_name_hash = Some(hashed);
        }

        let matched = self
            .tenants
            .update_tenant(
                tenant_id,
                TenantUpdate {
                    username: request.username,
                    website_url: request.website_url,
                    full_name_hash,
                    updated_at: Utc::now(),
                },
            )
            .await?;
        if !matched {
            self.audit_failure(
                tenant_id,
                &tenant.email,
                AuditAction::Update,
                "tenant not found during update",
            )
            .await;
            return Err(ServiceError::InvalidOperation(
                "tenant not found during update".to_string(),
            ));
        }

        self.audit_success(
            tenant_id,
            &tenant.email,
            AuditAction::Update,
            "Tenant data updated successfully",
        )
        .await;
        info!(%tenant_id, "tenant updated");

        Ok(())
    }

    /// Exports the tenant's recovered profile in the requested format.
    ///
    /// The format string is validated up front (`JSON` or `CSV`, case
    /// insensitive); the read path is the same as [`Self::get_tenant_data`].
    pub async fn export_tenant_data(
        &self,
        tenant_id: &str,
        client_id: &str,
        format: &str,
    ) -> ServiceResult<String> {
        if format.is_empty() {
            self.audit_failure(
                tenant_id,
                "System",
                AuditAction::Download,
                "export called with empty format",
            )
            .await;
            return Err(ServiceError::InvalidArgument(
                "format must not be empty".to_string(),
            ));
        }
        let format = match ExportFormat::from_str(format) {
            Ok(f) => f,
            Err(e) => {
                self.audit_failure(
                    tenant_id,
                    "System",
                    AuditAction::Download,
                    &format!("invalid export format: {format}"),
                )
                .await;
                return Err(e);
            }
        };

        let tenant = authorize_tenant(
            &self.tenants,
            &self.ledger,
            tenant_id,
            client_id,
            AuditAction::Download,
        )
        .await?;

        let (full_name, email) = self.recover_pii(&tenant).await?;
        let profile = build_profile(&tenant, full_name, email);

        let formatted = match format {
            ExportFormat::Json => serde_json::to_string_pretty(&profile).map_err(|e| {
                ServiceError::InvalidOperation(format!("failed to format tenant data: {e}"))
            })?,
            ExportFormat::Csv => profile_to_csv(&profile),
        };

        self.audit_success(
            tenant_id,
            &tenant.email,
            AuditAction::Download,
            &format!("Tenant data downloaded as {format:?}"),
        )
        .await;
        info!(%tenant_id, ?format, "tenant data exported");

        Ok(formatted)
    }

    /// Decrypts the FullName and Email originals for a tenant, falling
    /// back to the stored hash for a field with no mapping.
    async fn recover_pii(&self, tenant: &Tenant) -> ServiceResult<(String, String)> {
        let mappings = self.mappings.mappings_for_tenant(&tenant.id, None).await?;
        let mut full_name = tenant.full_name.clone();
        let mut email = tenant.email.clone();

        for mapping in &mappings {
            let original = match decrypt_string(&self.key, &mapping.encrypted_original) {
                Ok(value) => value,
                Err(e) => {
                    self.audit_failure(
                        &tenant.id,
                        "System",
                        AuditAction::Access,
                        &format!("failed to decrypt {} mapping", mapping.field_kind),
                    )
                    .await;
                    error!(tenant_id = %tenant.id, field = %mapping.field_kind, "mapping decryption failed");
                    return Err(e.into());
                }
            };
            match mapping.field_kind {
                FieldKind::FullName => full_name = original,
                FieldKind::Email => email = original,
            }
        }

        Ok((full_name, email))
    }

    async fn audit_success(
        &self,
        tenant_id: &str,
        performed_by: &str,
        action: AuditAction,
        message: &str,
    ) {
        self.ledger
            .record(AuditLog::new(
                Some(tenant_id),
                performed_by.to_string(),
                ActorType::User,
                action,
                TargetEntity::Tenant,
                Some(tenant_id.to_string()),
                action_details(message),
                true,
            ))
            .await;
    }

    async fn audit_failure(
        &self,
        tenant_id: &str,
        performed_by: &str,
        action: AuditAction,
        error: &str,
    ) {
        let tenant_id = (!tenant_id.is_empty()).then_some(tenant_id);
        self.ledger
            .record(AuditLog::new(
                tenant_id,
                performed_by.to_string(),
                ActorType::System,
                action,
                TargetEntity::Tenant,
                tenant_id.map(str::to_string),
                error_details(error),
                false,
            ))
            .await;
    }
}

fn build_profile(tenant: &Tenant, full_name: String, email: String) -> TenantProfile {
    TenantProfile {
        id: tenant.id.clone(),
        full_name,
        email,
        username: tenant.username.clone(),
        account_type: tenant.account_type,
        role: tenant.role,
        email_confirmed: tenant.email_confirmed,
        created_at: tenant.created_at,
        website_url: tenant.website_url.clone(),
        account_request_id: tenant.account_request_id.clone(),
        consent_accepted: tenant.consent_accepted,
        consent_accepted_at: tenant.consent_accepted_at,
        retention_expiry: tenant.retention_expiry,
    }
}

/// Renders a profile as a one-row CSV: a header line of field names and a
/// quoted value line, with embedded quotes doubled.
fn profile_to_csv(profile: &TenantProfile) -> String {
    let columns = [
        ("id", profile.id.clone()),
        ("full_name", profile.full_name.clone()),
        ("email", profile.email.clone()),
        ("username", profile.username.clone()),
        ("account_type", profile.account_type.to_string()),
        ("role", profile.role.to_string()),
        ("email_confirmed", profile.email_confirmed.to_string()),
        ("created_at", profile.created_at.to_rfc3339()),
        (
            "website_url",
            profile.website_url.clone().unwrap_or_default(),
        ),
        ("account_request_id", profile.account_request_id.clone()),
        ("consent_accepted", profile.consent_accepted.to_string()),
        (
            "consent_accepted_at",
            profile.consent_accepted_at.to_rfc3339(),
        ),
        (
            "retention_expiry",
            profile
                .retention_expiry
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ),
    ];

    let header: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    let values: Vec<String> = columns
        .iter()
        .map(|(_, value)| format!("\"{}\"", value.replace('"', "\"\"")))
        .collect();
    format!("{}\n{}", header.join(","), values.join(","))
}
