//! Async storage ports, one per aggregate.

use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gdprkit_model::{
    EncryptedAudienceRecord, FieldKind, PseudonymMapping, RefreshToken, Tenant,
};

/// Field-level tenant update (the update-with-filter contract).
///
/// `None` fields are left untouched; `updated_at` is always written.
#[derive(Clone, Debug)]
pub struct TenantUpdate {
    pub username: Option<String>,
    pub website_url: Option<String>,
    /// Already-hashed replacement full name.
    pub full_name_hash: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant records.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn exists_by_email(&self, hashed_email: &str) -> StoreResult<bool>;

    /// Inserts a tenant together with its initial pseudonym mappings.
    /// Atomic per call: either all records land or none do.
    async fn create_tenant(
        &self,
        tenant: Tenant,
        mappings: Vec<PseudonymMapping>,
    ) -> StoreResult<()>;

    async fn get_by_email(&self, hashed_email: &str) -> StoreResult<Option<Tenant>>;

    async fn get_by_id(&self, tenant_id: &str) -> StoreResult<Option<Tenant>>;

    /// Applies a partial update; returns `false` when no tenant matched.
    async fn update_tenant(&self, tenant_id: &str, update: TenantUpdate) -> StoreResult<bool>;
}

/// Pseudonym mappings, keyed on (tenant id, field kind).
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Creates the composite (tenant id, field kind) index. Idempotent;
    /// called at startup or first use.
    async fn ensure_mapping_index(&self) -> StoreResult<()>;

    async fn mappings_for_tenant(
        &self,
        tenant_id: &str,
        field_kind: Option<FieldKind>,
    ) -> StoreResult<Vec<PseudonymMapping>>;

    /// Replaces the live mapping for the mapping's (tenant, field kind),
    /// inserting when none exists. Must be atomic at the store level so
    /// concurrent replacements end with exactly one live mapping.
    async fn upsert_mapping(&self, mapping: PseudonymMapping) -> StoreResult<()>;
}

/// Refresh tokens and their rotation chain.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert_token(&self, token: RefreshToken) -> StoreResult<()>;

    async fn get_by_token(&self, token: &str) -> StoreResult<Option<RefreshToken>>;

    /// Marks `token` revoked now, recording the revoking IP and the
    /// successor token value. Returns `false` when no token matched.
    async fn revoke_token(
        &self,
        token: &str,
        revoked_by_ip: &str,
        replaced_by: &str,
    ) -> StoreResult<bool>;
}

/// Encrypted audience records.
#[async_trait]
pub trait AudienceStore: Send + Sync {
    async fn insert_audience(&self, record: EncryptedAudienceRecord) -> StoreResult<()>;

    async fn audiences_for_tenant(
        &self,
        tenant_id: &str,
    ) -> StoreResult<Vec<EncryptedAudienceRecord>>;
}
