//! In-memory reference implementation of every storage port.

use crate::error::{StoreError, StoreResult};
use crate::ports::{AudienceStore, MappingStore, RefreshTokenStore, TenantStore, TenantUpdate};
use async_trait::async_trait;
use chrono::Utc;
use gdprkit_model::{
    EncryptedAudienceRecord, FieldKind, PseudonymMapping, RefreshToken, Tenant,
};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    tenants: Vec<Tenant>,
    mappings: Vec<PseudonymMapping>,
    tokens: Vec<RefreshToken>,
    audiences: Vec<EncryptedAudienceRecord>,
}

/// In-memory document store for tests and reference wiring.
///
/// One `RwLock` guards all collections, so multi-record operations
/// (`create_tenant`, `upsert_mapping`) are atomic with respect to each
/// other — the same guarantee a real document store must provide for the
/// insert-many and upsert-by-filter calls.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn exists_by_email(&self, hashed_email: &str) -> StoreResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .tenants
            .iter()
            .any(|t| t.email == hashed_email))
    }

    async fn create_tenant(
        &self,
        tenant: Tenant,
        mappings: Vec<PseudonymMapping>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.tenants.iter().any(|t| t.id == tenant.id) {
            return Err(StoreError::Duplicate(tenant.id));
        }
        inner.tenants.push(tenant);
        inner.mappings.extend(mappings);
        Ok(())
    }

    async fn get_by_email(&self, hashed_email: &str) -> StoreResult<Option<Tenant>> {
        Ok(self
            .inner
            .read()
            .await
            .tenants
            .iter()
            .find(|t| t.email == hashed_email)
            .cloned())
    }

    async fn get_by_id(&self, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        Ok(self
            .inner
            .read()
            .await
            .tenants
            .iter()
            .find(|t| t.id == tenant_id)
            .cloned())
    }

    async fn update_tenant(&self, tenant_id: &str, update: TenantUpdate) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(tenant) = inner.tenants.iter_mut().find(|t| t.id == tenant_id) else {
            return Ok(false);
        };
        if let Some(username) = update.username {
            tenant.username = username;
        }
        if let Some(url) = update.website_url {
            tenant.website_url = Some(url);
        }
        if let Some(hash) = update.full_name_hash {
            tenant.full_name = hash;
        }
        tenant.updated_at = update.updated_at;
        Ok(true)
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn ensure_mapping_index(&self) -> StoreResult<()> {
        // Linear scans need no index; real stores create the composite
        // (tenant_id, field_kind) index here.
        Ok(())
    }

    async fn mappings_for_tenant(
        &self,
        tenant_id: &str,
        field_kind: Option<FieldKind>,
    ) -> StoreResult<Vec<PseudonymMapping>> {
        Ok(self
            .inner
            .read()
            .await
            .mappings
            .iter()
            .filter(|m| {
                m.tenant_id == tenant_id && field_kind.is_none_or(|k| m.field_kind == k)
            })
            .cloned()
            .collect())
    }

    async fn upsert_mapping(&self, mapping: PseudonymMapping) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        match inner
            .mappings
            .iter_mut()
            .find(|m| m.tenant_id == mapping.tenant_id && m.field_kind == mapping.field_kind)
        {
            // Replace in place, keeping the existing record id.
            Some(existing) => {
                let id = existing.id.clone();
                *existing = mapping;
                existing.id = id;
            }
            None => inner.mappings.push(mapping),
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert_token(&self, token: RefreshToken) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.tokens.iter().any(|t| t.token == token.token) {
            return Err(StoreError::Duplicate(token.id));
        }
        inner.tokens.push(token);
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self
            .inner
            .read()
            .await
            .tokens
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn revoke_token(
        &self,
        token: &str,
        revoked_by_ip: &str,
        replaced_by: &str,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.tokens.iter_mut().find(|t| t.token == token) else {
            return Ok(false);
        };
        stored.is_revoked = true;
        stored.revoked_at = Some(Utc::now());
        stored.revoked_by_ip = Some(revoked_by_ip.to_string());
        stored.replaced_by_token = Some(replaced_by.to_string());
        Ok(true)
    }
}

#[async_trait]
impl AudienceStore for MemoryStore {
    async fn insert_audience(&self, record: EncryptedAudienceRecord) -> StoreResult<()> {
        self.inner.write().await.audiences.push(record);
        Ok(())
    }

    async fn audiences_for_tenant(
        &self,
        tenant_id: &str,
    ) -> StoreResult<Vec<EncryptedAudienceRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .audiences
            .iter()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}
