//! The authorization gate shared by every tenant-scoped data operation.

use crate::error::{ServiceError, ServiceResult};
use gdprkit_audit::{ActorType, AuditAction, AuditLedger, AuditLog, TargetEntity};
use gdprkit_model::Tenant;
use gdprkit_store::TenantStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn action_details(message: &str) -> BTreeMap<String, serde_json::Value> {
    let mut details = BTreeMap::new();
    details.insert(
        "Action".to_string(),
        serde_json::Value::String(message.to_string()),
    );
    details
}

pub(crate) fn error_details(message: &str) -> BTreeMap<String, serde_json::Value> {
    let mut details = BTreeMap::new();
    details.insert(
        "Error".to_string(),
        serde_json::Value::String(message.to_string()),
    );
    details
}

/// Records a gate failure before its error propagates.
async fn audit_gate_failure(
    ledger: &AuditLedger,
    tenant_id: Option<&str>,
    action: AuditAction,
    error: &str,
) {
    ledger
        .record(AuditLog::new(
            tenant_id,
            "System".to_string(),
            ActorType::System,
            action,
            TargetEntity::Tenant,
            tenant_id.map(str::to_string),
            error_details(error),
            false,
        ))
        .await;
}

/// Authorizes one tenant-scoped data operation.
///
/// Checks run in a fixed order: the tenant must exist, the supplied client
/// id must equal the tenant's stored client id, and the tenant must have
/// accepted data-processing consent. Each failure is audited under
/// `action` before the error is returned; on success the loaded tenant is
/// handed back so callers do not fetch it twice.
pub(crate) async fn authorize_tenant(
    tenants: &Arc<dyn TenantStore>,
    ledger: &AuditLedger,
    tenant_id: &str,
    client_id: &str,
    action: AuditAction,
) -> ServiceResult<Tenant> {
    if tenant_id.is_empty() || client_id.is_empty() {
        let message = "tenant id and client id must not be empty";
        audit_gate_failure(ledger, None, action, message).await;
        warn!(%action, "{message}");
        return Err(ServiceError::InvalidArgument(message.to_string()));
    }

    let Some(tenant) = tenants.get_by_id(tenant_id).await? else {
        audit_gate_failure(ledger, Some(tenant_id), action, "tenant not found").await;
        warn!(%tenant_id, %action, "tenant not found");
        return Err(ServiceError::InvalidOperation("tenant not found".to_string()));
    };

    if tenant.client_id != client_id {
        audit_gate_failure(
            ledger,
            Some(tenant_id),
            action,
            "unauthorized access: client id does not match",
        )
        .await;
        warn!(%tenant_id, %action, "client id mismatch");
        return Err(ServiceError::Unauthorized("invalid client id".to_string()));
    }

    if !tenant.consent_accepted {
        audit_gate_failure(
            ledger,
            Some(tenant_id),
            action,
            "tenant has not provided consent for data processing",
        )
        .await;
        warn!(%tenant_id, %action, "consent not accepted");
        return Err(ServiceError::InvalidOperation(
            "tenant consent is required for data processing".to_string(),
        ));
    }

    Ok(tenant)
}
