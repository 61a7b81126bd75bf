//! Upsert and atomicity behavior of the in-memory reference store.

use chrono::Utc;
use gdprkit_model::{
    AccountType, FieldKind, PseudonymMapping, RefreshToken, Tenant, TenantRole,
};
use gdprkit_store::{MappingStore, MemoryStore, RefreshTokenStore, TenantStore, TenantUpdate};
use uuid::Uuid;

fn make_tenant(id: &str, hashed_email: &str) -> Tenant {
    let now = Utc::now();
    Tenant {
        id: id.to_string(),
        full_name: "hashed-name".to_string(),
        email: hashed_email.to_string(),
        password_hash: vec![1; 32],
        password_salt: vec![2; 16],
        username: "acme".to_string(),
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
    }
}

fn make_mapping(tenant_id: &str, kind: FieldKind, blob: &[u8]) -> PseudonymMapping {
    PseudonymMapping {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        hashed_value: format!("hash-of-{kind}"),
        encrypted_original: blob.to_vec(),
        field_kind: kind,
        retention_expiry: None,
    }
}

// ── Tenant + Mapping Creation ──

#[tokio::test]
async fn create_tenant_inserts_tenant_and_mappings_together() {
    let store = MemoryStore::new();
    store
        .create_tenant(
            make_tenant("t1", "hash-email"),
            vec![
                make_mapping("t1", FieldKind::FullName, b"blob-a"),
                make_mapping("t1", FieldKind::Email, b"blob-b"),
            ],
        )
        .await
        .unwrap();

    assert!(store.exists_by_email("hash-email").await.unwrap());
    let mappings = store.mappings_for_tenant("t1", None).await.unwrap();
    assert_eq!(mappings.len(), 2);
}

#[tokio::test]
async fn duplicate_tenant_id_is_rejected() {
    let store = MemoryStore::new();
    store
        .create_tenant(make_tenant("t1", "a"), vec![])
        .await
        .unwrap();
    assert!(store
        .create_tenant(make_tenant("t1", "b"), vec![])
        .await
        .is_err());
}

// ── Mapping Upsert ──

#[tokio::test]
async fn upsert_replaces_instead_of_duplicating() {
    let store = MemoryStore::new();
    store
        .upsert_mapping(make_mapping("t1", FieldKind::FullName, b"first"))
        .await
        .unwrap();
    store
        .upsert_mapping(make_mapping("t1", FieldKind::FullName, b"second"))
        .await
        .unwrap();

    let mappings = store
        .mappings_for_tenant("t1", Some(FieldKind::FullName))
        .await
        .unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].encrypted_original, b"second");
}

#[tokio::test]
async fn upsert_keeps_the_original_record_id() {
    let store = MemoryStore::new();
    store
        .upsert_mapping(make_mapping("t1", FieldKind::Email, b"first"))
        .await
        .unwrap();
    let original_id = store
        .mappings_for_tenant("t1", Some(FieldKind::Email))
        .await
        .unwrap()[0]
        .id
        .clone();

    store
        .upsert_mapping(make_mapping("t1", FieldKind::Email, b"second"))
        .await
        .unwrap();
    let after = store
        .mappings_for_tenant("t1", Some(FieldKind::Email))
        .await
        .unwrap();
    assert_eq!(after[0].id, original_id);
}

#[tokio::test]
async fn upsert_is_scoped_per_tenant_and_field() {
    let store = MemoryStore::new();
    store
        .upsert_mapping(make_mapping("t1", FieldKind::Email, b"t1-email"))
        .await
        .unwrap();
    store
        .upsert_mapping(make_mapping("t2", FieldKind::Email, b"t2-email"))
        .await
        .unwrap();
    store
        .upsert_mapping(make_mapping("t1", FieldKind::FullName, b"t1-name"))
        .await
        .unwrap();

    assert_eq!(store.mappings_for_tenant("t1", None).await.unwrap().len(), 2);
    assert_eq!(store.mappings_for_tenant("t2", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_upserts_leave_one_live_mapping() {
    let store = MemoryStore::new();
    let mut handles = Vec::new();
    for i in 0..16u8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .upsert_mapping(make_mapping("t1", FieldKind::FullName, &[i]))
                .await
                .unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    let mappings = store
        .mappings_for_tenant("t1", Some(FieldKind::FullName))
        .await
        .unwrap();
    assert_eq!(mappings.len(), 1);
}

// ── Tenant Update ──

#[tokio::test]
async fn update_applies_only_provided_fields() {
    let store = MemoryStore::new();
    store
        .create_tenant(make_tenant("t1", "hash-email"), vec![])
        .await
        .unwrap();

    let matched = store
        .update_tenant(
            "t1",
            TenantUpdate {
                username: Some("new-name".to_string()),
                website_url: None,
                full_name_hash: None,
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    assert!(matched);

    let tenant = store.get_by_id("t1").await.unwrap().unwrap();
    assert_eq!(tenant.username, "new-name");
    assert_eq!(tenant.email, "hash-email");
}

#[tokio::test]
async fn update_unknown_tenant_matches_nothing() {
    let store = MemoryStore::new();
    let matched = store
        .update_tenant(
            "missing",
            TenantUpdate {
                username: None,
                website_url: None,
                full_name_hash: None,
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    assert!(!matched);
}

// ── Refresh Tokens ──

#[tokio::test]
async fn revoke_chains_to_successor() {
    let store = MemoryStore::new();
    let token = RefreshToken {
        id: "rt1".to_string(),
        tenant_id: "t1".to_string(),
        token: "opaque-1".to_string(),
        created_at: Utc::now(),
        expires_at: Utc::now() + chrono::Duration::minutes(30),
        created_by_ip: "10.0.0.1".to_string(),
        is_revoked: false,
        revoked_at: None,
        revoked_by_ip: None,
        replaced_by_token: None,
    };
    store.insert_token(token).await.unwrap();

    let matched = store
        .revoke_token("opaque-1", "10.0.0.2", "opaque-2")
        .await
        .unwrap();
    assert!(matched);

    let stored = store.get_by_token("opaque-1").await.unwrap().unwrap();
    assert!(stored.is_revoked);
    assert_eq!(stored.replaced_by_token.as_deref(), Some("opaque-2"));
    assert_eq!(stored.revoked_by_ip.as_deref(), Some("10.0.0.2"));
    assert!(stored.revoked_at.is_some());
}
