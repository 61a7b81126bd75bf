//! Storage port for the ledger and the in-memory reference implementation.

use crate::error::{AuditError, AuditResult};
use crate::record::AuditLog;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only storage collaborator for audit entries.
///
/// No update or delete is exposed; the ledger only ever inserts.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, entry: AuditLog) -> AuditResult<()>;

    async fn exists(&self, id: &str) -> AuditResult<bool>;

    /// All entries for one tenant, in append order. Consumed by compliance
    /// tooling and integrity sweeps.
    async fn list_for_tenant(&self, tenant_id: &str) -> AuditResult<Vec<AuditLog>>;
}

/// In-memory audit store for tests and the reference wiring.
#[derive(Clone, Default)]
pub struct MemoryAuditStore {
    entries: Arc<RwLock<Vec<AuditLog>>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry ever appended, regardless of tenant.
    pub async fn all(&self) -> Vec<AuditLog> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, entry: AuditLog) -> AuditResult<()> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(AuditError::DuplicateId(entry.id));
        }
        entries.push(entry);
        Ok(())
    }

    async fn exists(&self, id: &str) -> AuditResult<bool> {
        Ok(self.entries.read().await.iter().any(|e| e.id == id))
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> AuditResult<Vec<AuditLog>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}
