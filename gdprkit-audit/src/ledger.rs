//! Ledger append validation and best-effort recording.

use crate::error::{AuditError, AuditResult};
use crate::record::{ActorType, AuditLog};
use crate::store::AuditStore;
use std::sync::Arc;
use tracing::{debug, error};

/// Validates and appends audit entries.
#[derive(Clone)]
pub struct AuditLedger {
    store: Arc<dyn AuditStore>,
}

impl AuditLedger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Appends one entry, returning its id.
    ///
    /// Validates required fields, rejects duplicate ids, and attaches the
    /// integrity hash when the caller has not already set one.
    pub async fn append(&self, mut entry: AuditLog) -> AuditResult<String> {
        if entry.tenant_id.is_empty() {
            return Err(AuditError::InvalidEntry("tenant_id is required".to_string()));
        }
        if matches!(entry.actor_type, ActorType::User | ActorType::Admin)
            && entry.performed_by.is_empty()
        {
            return Err(AuditError::InvalidEntry(
                "performed_by is required for User or Admin actors".to_string(),
            ));
        }

        if self.store.exists(&entry.id).await? {
            return Err(AuditError::DuplicateId(entry.id));
        }

        if entry.integrity_hash.is_none() {
            entry.integrity_hash = Some(entry.compute_integrity_hash()?);
        }

        let id = entry.id.clone();
        self.store.insert(entry).await?;
        debug!(audit_id = %id, "audit entry appended");
        Ok(id)
    }

    /// Best-effort append for use inside business operations.
    ///
    /// A ledger failure here is logged and swallowed so it can never mask
    /// the primary operation's outcome.
    pub async fn record(&self, entry: AuditLog) {
        let action = entry.action;
        let tenant_id = entry.tenant_id.clone();
        if let Err(e) = self.append(entry).await {
            error!(%tenant_id, %action, "failed to append audit entry: {e}");
        }
    }
}

/// Resolves the performer identity stored on an entry.
///
/// Identities from non-user contexts are pseudonymized with the same hash
/// used for tenant PII; a plain user context keeps its identifier, and a
/// missing performer becomes `"System"`.
pub fn pseudonymize_performer(performed_by: Option<&str>, actor_type: ActorType) -> String {
    match performed_by {
        Some(who) if actor_type != ActorType::User => {
            gdprkit_crypto::hash_string(who).unwrap_or_else(|_| "System".to_string())
        }
        Some(who) => who.to_string(),
        None => "System".to_string(),
    }
}
