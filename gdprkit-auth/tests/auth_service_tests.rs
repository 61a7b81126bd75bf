//! End-to-end credential lifecycle: registration, authentication,
//! refresh-token rotation, and tamper handling.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gdprkit_audit::{AuditAction, AuditLedger, MemoryAuditStore, TargetEntity};
use gdprkit_auth::{decode_access_token, AuthConfig, AuthError, AuthService};
use gdprkit_crypto::{decrypt_string, hash_string, CryptoError, EncryptionKey};
use gdprkit_model::{
    AccountType, FieldKind, RefreshToken, RegisterTenantRequest, Tenant, TenantRole,
};
use gdprkit_store::{MappingStore, MemoryStore, RefreshTokenStore, StoreResult, TenantStore};
use std::sync::Arc;
use uuid::Uuid;

fn test_key() -> EncryptionKey {
    EncryptionKey::from_bytes([7u8; 32])
}

fn test_config() -> AuthConfig {
    AuthConfig {
        token_secret: "test-secret".to_string(),
        ..AuthConfig::default()
    }
}

fn registration(email: &str) -> RegisterTenantRequest {
    RegisterTenantRequest {
        full_name: "Jane Doe".to_string(),
        email: email.to_string(),
        username: "janedoe".to_string(),
        password: "correct horse battery".to_string(),
        confirm_password: "correct horse battery".to_string(),
        website_url: Some("https://example.org".to_string()),
        consent_accepted: true,
    }
}

struct Harness {
    service: AuthService,
    store: Arc<MemoryStore>,
    audit: MemoryAuditStore,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let audit = MemoryAuditStore::new();
    let service = AuthService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        AuditLedger::new(Arc::new(audit.clone())),
        test_key(),
        test_config(),
    );
    Harness {
        service,
        store,
        audit,
    }
}

// ── Registration ──

#[tokio::test]
async fn register_stores_hashed_pii_and_recoverable_mappings() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();

    assert_ne!(tenant.email, "jane@example.org");
    assert_ne!(tenant.full_name, "Jane Doe");
    assert!(!tenant.client_id.is_empty());
    assert!(tenant.retention_expiry.unwrap() > Utc::now());

    let mappings = h.store.mappings_for_tenant(&tenant.id, None).await.unwrap();
    assert_eq!(mappings.len(), 2);
    let email_mapping = mappings
        .iter()
        .find(|m| m.field_kind == FieldKind::Email)
        .unwrap();
    assert_eq!(email_mapping.hashed_value, tenant.email);
    assert_eq!(
        decrypt_string(&test_key(), &email_mapping.encrypted_original).unwrap(),
        "jane@example.org"
    );
}

#[tokio::test]
async fn register_rejects_password_mismatch() {
    let h = harness();
    let mut request = registration("jane@example.org");
    request.confirm_password = "something else".to_string();

    let err = h.service.register_tenant(request).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidArgument(_)));

    let entries = h.audit.all().await;
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].is_success);
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let h = harness();
    let err = h
        .service
        .register_tenant(registration("not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidArgument(_)));
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let h = harness();
    h.service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();
    let err = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidOperation(_)));
}

// ── Authentication ──

#[tokio::test]
async fn authenticate_issues_tokens_with_plaintext_email_claim() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();

    let pair = h
        .service
        .authenticate("jane@example.org", "correct horse battery", "10.0.0.1")
        .await
        .unwrap();

    let claims = decode_access_token(&test_config(), &pair.access_token).unwrap();
    assert_eq!(claims.sub, tenant.id);
    assert_eq!(claims.tenant_id, tenant.id);
    assert_eq!(claims.email, "jane@example.org");
    assert_eq!(claims.role, "Owner");

    let success = h
        .audit
        .all()
        .await
        .into_iter()
        .find(|e| e.action == AuditAction::Authentication)
        .unwrap();
    assert!(success.is_success);
    // The ledger stores the hashed email, never the recovered plaintext.
    assert_eq!(success.performed_by, tenant.email);
    assert_ne!(success.performed_by, "jane@example.org");
}

#[tokio::test]
async fn authenticate_rejects_wrong_password_and_audits_login_failure() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();

    let err = h
        .service
        .authenticate("jane@example.org", "wrong password!", "10.0.0.1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidOperation(_)));

    let failures: Vec<_> = h
        .audit
        .all()
        .await
        .into_iter()
        .filter(|e| e.action == AuditAction::LoginFailed)
        .collect();
    assert_eq!(failures.len(), 1);
    assert!(!failures[0].is_success);
    assert_eq!(failures[0].tenant_id, tenant.id);
}

#[tokio::test]
async fn authenticate_rejects_unknown_email_without_revealing_which_field() {
    let h = harness();
    let err = h
        .service
        .authenticate("nobody@example.org", "whatever pass", "10.0.0.1")
        .await
        .unwrap_err();
    match err {
        AuthError::InvalidOperation(msg) => assert_eq!(msg, "invalid email or password"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_email_mapping_fails_and_is_audited() {
    let h = harness();
    let now = Utc::now();
    let tenant = Tenant {
        id: "t-unmapped".to_string(),
        full_name: hash_string("Jane Doe").unwrap(),
        email: hash_string("jane@example.org").unwrap(),
        password_hash: vec![1; 32],
        password_salt: vec![2; 16],
        username: "janedoe".to_string(),
        account_type: AccountType::Basic,
        role: TenantRole::Owner,
        email_confirmed: false,
        created_at: now,
        updated_at: now,
        website_url: None,
        account_request_id: Uuid::new_v4().to_string(),
        consent_accepted: true,
        consent_accepted_at: now,
        retention_expiry: None,
        client_id: Uuid::new_v4().simple().to_string(),
    };
    h.store.create_tenant(tenant, vec![]).await.unwrap();

    let err = h
        .service
        .authenticate("jane@example.org", "whatever pass", "10.0.0.1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidOperation(_)));

    // The failure leaves a trace like every other authentication failure.
    let entries = h.audit.all().await;
    assert!(entries
        .iter()
        .any(|e| !e.is_success && e.tenant_id == "t-unmapped"));
}

#[tokio::test]
async fn authenticate_fails_hard_on_tampered_email_mapping() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();

    // Corrupt one ciphertext byte of the stored email mapping.
    let mut mapping = h
        .store
        .mappings_for_tenant(&tenant.id, Some(FieldKind::Email))
        .await
        .unwrap()
        .remove(0);
    let last = mapping.encrypted_original.len() - 1;
    mapping.encrypted_original[last] ^= 0x01;
    h.store.upsert_mapping(mapping).await.unwrap();

    let err = h
        .service
        .authenticate("jane@example.org", "correct horse battery", "10.0.0.1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Crypto(CryptoError::TamperDetected)
    ));

    let entries = h.audit.all().await;
    let failure = entries
        .iter()
        .find(|e| !e.is_success && e.action == AuditAction::Authentication)
        .unwrap();
    assert_eq!(failure.tenant_id, tenant.id);
}

// ── Refresh Rotation ──

#[tokio::test]
async fn refresh_rotates_token_and_chains_the_old_one() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();
    let first = h
        .service
        .authenticate("jane@example.org", "correct horse battery", "10.0.0.1")
        .await
        .unwrap();

    let second = h
        .service
        .refresh(&first.refresh_token, "10.0.0.2", &tenant.client_id)
        .await
        .unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    let old = h
        .store
        .get_by_token(&first.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(old.is_revoked);
    assert_eq!(old.revoked_by_ip.as_deref(), Some("10.0.0.2"));
    assert_eq!(
        old.replaced_by_token.as_deref(),
        Some(second.refresh_token.as_str())
    );
    assert!(h
        .store
        .get_by_token(&second.refresh_token)
        .await
        .unwrap()
        .unwrap()
        .is_active());
}

#[tokio::test]
async fn replaying_a_rotated_token_is_rejected_and_flagged() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();
    let first = h
        .service
        .authenticate("jane@example.org", "correct horse battery", "10.0.0.1")
        .await
        .unwrap();
    h.service
        .refresh(&first.refresh_token, "10.0.0.1", &tenant.client_id)
        .await
        .unwrap();

    let err = h
        .service
        .refresh(&first.refresh_token, "198.51.100.7", &tenant.client_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)));

    let replay = h
        .audit
        .all()
        .await
        .into_iter()
        .find(|e| e.target_entity == TargetEntity::SecurityEvent)
        .unwrap();
    assert!(!replay.is_success);
    assert_eq!(replay.tenant_id, tenant.id);
}

/// Token store whose revoke never matches, as if the old token was
/// deleted between lookup and revocation.
struct VanishingTokenStore(Arc<MemoryStore>);

#[async_trait]
impl RefreshTokenStore for VanishingTokenStore {
    async fn insert_token(&self, token: RefreshToken) -> StoreResult<()> {
        self.0.insert_token(token).await
    }

    async fn get_by_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        self.0.get_by_token(token).await
    }

    async fn revoke_token(
        &self,
        _token: &str,
        _revoked_by_ip: &str,
        _replaced_by: &str,
    ) -> StoreResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn refresh_tolerates_old_token_vanishing_before_revocation() {
    let store = Arc::new(MemoryStore::new());
    let audit = MemoryAuditStore::new();
    let service = AuthService::new(
        store.clone(),
        store.clone(),
        Arc::new(VanishingTokenStore(store.clone())),
        AuditLedger::new(Arc::new(audit.clone())),
        test_key(),
        test_config(),
    );
    let tenant = service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();
    let first = service
        .authenticate("jane@example.org", "correct horse battery", "10.0.0.1")
        .await
        .unwrap();

    // Rotation still succeeds; the missed revocation must not fail it.
    let second = service
        .refresh(&first.refresh_token, "10.0.0.1", &tenant.client_id)
        .await
        .unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    let old = store.get_by_token(&first.refresh_token).await.unwrap().unwrap();
    assert!(!old.is_revoked);
}

#[tokio::test]
async fn refresh_rejects_unknown_token() {
    let h = harness();
    let err = h
        .service
        .refresh("never-issued", "10.0.0.1", "any-client")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)));
}

#[tokio::test]
async fn refresh_rejects_expired_token() {
    let h = harness();
    let tenant = h
        .service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();

    let now = Utc::now();
    h.store
        .insert_token(RefreshToken {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant.id.clone(),
            token: "stale-token".to_string(),
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
            created_by_ip: "10.0.0.1".to_string(),
            is_revoked: false,
            revoked_at: None,
            revoked_by_ip: None,
            replaced_by_token: None,
        })
        .await
        .unwrap();

    let err = h
        .service
        .refresh("stale-token", "10.0.0.1", &tenant.client_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)));

    let expired = h
        .audit
        .all()
        .await
        .into_iter()
        .find(|e| e.action == AuditAction::SessionExpired)
        .unwrap();
    assert!(!expired.is_success);
}

#[tokio::test]
async fn refresh_rejects_client_id_mismatch() {
    let h = harness();
    h.service
        .register_tenant(registration("jane@example.org"))
        .await
        .unwrap();
    let pair = h
        .service
        .authenticate("jane@example.org", "correct horse battery", "10.0.0.1")
        .await
        .unwrap();

    let err = h
        .service
        .refresh(&pair.refresh_token, "10.0.0.1", "wrong-client-id")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)));
}
