//! Registration, authentication, and refresh-token rotation.

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::token::{generate_refresh_token, issue_access_token};
use chrono::{Duration, Utc};
use gdprkit_audit::{
    pseudonymize_performer, ActorType, AuditAction, AuditLedger, AuditLog, TargetEntity,
};
use gdprkit_crypto::{decrypt_string, encrypt_string, hash_string, EncryptionKey};
use gdprkit_model::{
    AccountType, FieldKind, PseudonymMapping, RefreshToken, RegisterTenantRequest, Tenant,
    TenantRole, TokenPair,
};
use gdprkit_store::{MappingStore, RefreshTokenStore, TenantStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

fn action_details(message: &str) -> BTreeMap<String, serde_json::Value> {
    let mut details = BTreeMap::new();
    details.insert(
        "Action".to_string(),
        serde_json::Value::String(message.to_string()),
    );
    details
}

fn error_details(message: &str) -> BTreeMap<String, serde_json::Value> {
    let mut details = BTreeMap::new();
    details.insert(
        "Error".to_string(),
        serde_json::Value::String(message.to_string()),
    );
    details
}

/// Credential and token lifecycle service.
pub struct AuthService {
    tenants: Arc<dyn TenantStore>,
    mappings: Arc<dyn MappingStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    ledger: AuditLedger,
    key: EncryptionKey,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        mappings: Arc<dyn MappingStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        ledger: AuditLedger,
        key: EncryptionKey,
        config: AuthConfig,
    ) -> Self {
        Self {
            tenants,
            mappings,
            tokens,
            ledger,
            key,
            config,
        }
    }

    /// Registers a tenant: hashed PII on the tenant record, encrypted
    /// originals in the mapping store, salted password digest, fresh
    /// client id as the out-of-band shared secret.
    ///
    /// Returns the created tenant so the caller can hand out `client_id`.
    pub async fn register_tenant(&self, request: RegisterTenantRequest) -> AuthResult<Tenant> {
        if let Err(message) = validate_registration(&request) {
            self.audit_failure(
                None,
                Some(&request.email),
                ActorType::System,
                AuditAction::Create,
                TargetEntity::Tenant,
                None,
                &message,
            )
            .await;
            warn!("tenant registration rejected: {message}");
            return Err(AuthError::InvalidArgument(message));
        }

        let hashed_email = hash_string(&request.email)?;
        let already_exists = match self.tenants.exists_by_email(&hashed_email).await {
            Ok(exists) => exists,
            Err(e) => {
                self.audit_failure(
                    None,
                    Some(&request.email),
                    ActorType::System,
                    AuditAction::Create,
                    TargetEntity::Tenant,
                    None,
                    &format!("failed to check for existing tenant: {e}"),
                )
                .await;
                return Err(e.into());
            }
        };
        if already_exists {
            let message = "a tenant with this email already exists";
            self.audit_failure(
                None,
                Some(&request.email),
                ActorType::Anonymous,
                AuditAction::Create,
                TargetEntity::Tenant,
                None,
                message,
            )
            .await;
            warn!("attempt to register tenant with existing email");
            return Err(AuthError::InvalidOperation(message.to_string()));
        }

        // First-use index creation; idempotent.
        self.mappings.ensure_mapping_index().await?;

        let digest = gdprkit_crypto::hash_password(&request.password)?;
        let now = Utc::now();
        let retention_expiry = Some(now + Duration::days(self.config.retention_days));

        let tenant = Tenant {
            id: Uuid::new_v4().to_string(),
            full_name: hash_string(&request.full_name)?,
            email: hashed_email,
            password_hash: digest.hash,
            password_salt: digest.salt,
            username: request.username.clone(),
            account_type: AccountType::Basic,
            role: TenantRole::Owner,
            email_confirmed: false,
            created_at: now,
            updated_at: now,
            website_url: request.website_url.clone(),
            account_request_id: Uuid::new_v4().to_string(),
            consent_accepted: request.consent_accepted,
            consent_accepted_at: now,
            retention_expiry,
            client_id: Uuid::new_v4().simple().to_string(),
        };

        let initial_mappings = vec![
            PseudonymMapping {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant.id.clone(),
                hashed_value: tenant.full_name.clone(),
                encrypted_original: encrypt_string(&self.key, &request.full_name)?,
                field_kind: FieldKind::FullName,
                retention_expiry,
            },
            PseudonymMapping {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant.id.clone(),
                hashed_value: tenant.email.clone(),
                encrypted_original: encrypt_string(&self.key, &request.email)?,
                field_kind: FieldKind::Email,
                retention_expiry,
            },
        ];

        if let Err(e) = self
            .tenants
            .create_tenant(tenant.clone(), initial_mappings)
            .await
        {
            self.audit_failure(
                Some(&tenant.id),
                Some(&request.email),
                ActorType::System,
                AuditAction::Create,
                TargetEntity::Tenant,
                Some(tenant.id.clone()),
                &format!("failed to create tenant: {e}"),
            )
            .await;
            return Err(e.into());
        }

        self.ledger
            .record(AuditLog::new(
                Some(&tenant.id),
                tenant.email.clone(),
                ActorType::User,
                AuditAction::Create,
                TargetEntity::Tenant,
                Some(tenant.id.clone()),
                action_details("Tenant created successfully"),
                true,
            ))
            .await;
        info!(tenant_id = %tenant.id, account_request_id = %tenant.account_request_id, "tenant created");

        Ok(tenant)
    }

    /// Authenticates a tenant and issues an access/refresh token pair.
    ///
    /// The stored email mapping is decrypted and compared with the supplied
    /// plaintext as a tamper check; a decryption failure fails
    /// authentication hard — there is no hash-only fallback.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        ip_address: &str,
    ) -> AuthResult<TokenPair> {
        if email.is_empty() || password.is_empty() {
            let message = "email and password must not be empty";
            self.audit_failure(
                None,
                Some(email).filter(|e| !e.is_empty()),
                ActorType::System,
                AuditAction::Authentication,
                TargetEntity::Tenant,
                None,
                message,
            )
            .await;
            return Err(AuthError::InvalidArgument(message.to_string()));
        }

        let hashed_email = hash_string(email)?;
        let Some(tenant) = self.tenants.get_by_email(&hashed_email).await? else {
            self.audit_failure(
                None,
                Some(email),
                ActorType::Anonymous,
                AuditAction::LoginFailed,
                TargetEntity::Tenant,
                None,
                "authentication failed: invalid email or password",
            )
            .await;
            warn!("authentication failed: unknown email");
            return Err(AuthError::InvalidOperation(
                "invalid email or password".to_string(),
            ));
        };

        let email_mapping = self
            .email_mapping_for(&tenant, Some(email), AuditAction::Authentication)
            .await?;

        match decrypt_string(&self.key, &email_mapping.encrypted_original) {
            Ok(original) if original == email => {}
            Ok(_) => {
                self.audit_failure(
                    Some(&tenant.id),
                    Some(email),
                    ActorType::Anonymous,
                    AuditAction::Authentication,
                    TargetEntity::Tenant,
                    Some(tenant.id.clone()),
                    "decrypted email does not match supplied email",
                )
                .await;
                warn!(tenant_id = %tenant.id, "decrypted email mismatch");
                return Err(gdprkit_crypto::CryptoError::TamperDetected.into());
            }
            Err(e) => {
                self.audit_failure(
                    Some(&tenant.id),
                    Some(email),
                    ActorType::Anonymous,
                    AuditAction::Authentication,
                    TargetEntity::Tenant,
                    Some(tenant.id.clone()),
                    "email mapping decryption failed: data may have been tampered with",
                )
                .await;
                warn!(tenant_id = %tenant.id, "email mapping decryption failed");
                return Err(e.into());
            }
        }

        if !gdprkit_crypto::verify_password(password, &tenant.password_hash, &tenant.password_salt)?
        {
            self.audit_failure(
                Some(&tenant.id),
                Some(email),
                ActorType::Anonymous,
                AuditAction::LoginFailed,
                TargetEntity::Tenant,
                Some(tenant.id.clone()),
                "authentication failed: invalid email or password",
            )
            .await;
            warn!(tenant_id = %tenant.id, "authentication failed: bad password");
            return Err(AuthError::InvalidOperation(
                "invalid email or password".to_string(),
            ));
        }

        let pair = self.issue_pair(&tenant, email, ip_address).await?;

        self.ledger
            .record(AuditLog::new(
                Some(&tenant.id),
                tenant.email.clone(),
                ActorType::User,
                AuditAction::Authentication,
                TargetEntity::Tenant,
                Some(tenant.id.clone()),
                action_details(&format!("Tenant authenticated successfully from IP: {ip_address}")),
                true,
            ))
            .await;
        info!(tenant_id = %tenant.id, "tenant authenticated");

        Ok(pair)
    }

    /// Exchanges an active refresh token for a new token pair.
    ///
    /// The old token is revoked and chained to its successor. A token that
    /// is missing or expired fails `Unauthorized`; one that is already
    /// revoked is treated as replay and audited as a security event.
    pub async fn refresh(
        &self,
        token: &str,
        ip_address: &str,
        client_id: &str,
    ) -> AuthResult<TokenPair> {
        let stored = self.tokens.get_by_token(token).await?;

        let Some(stored) = stored else {
            self.audit_failure(
                None,
                None,
                ActorType::Anonymous,
                AuditAction::Authentication,
                TargetEntity::Session,
                None,
                "refresh rejected: unknown token",
            )
            .await;
            return Err(AuthError::Unauthorized(
                "invalid or expired refresh token".to_string(),
            ));
        };

        if stored.is_revoked {
            // Replay of an already-rotated token: possibly a stolen token
            // being reused after legitimate rotation.
            self.audit_failure(
                Some(&stored.tenant_id),
                None,
                ActorType::Anonymous,
                AuditAction::Authentication,
                TargetEntity::SecurityEvent,
                Some(stored.id.clone()),
                "refresh token replay detected: token already rotated",
            )
            .await;
            warn!(tenant_id = %stored.tenant_id, "refresh token replay detected");
            return Err(AuthError::Unauthorized(
                "invalid or expired refresh token".to_string(),
            ));
        }

        if stored.is_expired() {
            self.audit_failure(
                Some(&stored.tenant_id),
                None,
                ActorType::Anonymous,
                AuditAction::SessionExpired,
                TargetEntity::Session,
                Some(stored.id.clone()),
                "refresh rejected: token expired",
            )
            .await;
            return Err(AuthError::Unauthorized(
                "invalid or expired refresh token".to_string(),
            ));
        }

        let Some(tenant) = self.tenants.get_by_id(&stored.tenant_id).await? else {
            self.audit_failure(
                None,
                None,
                ActorType::Anonymous,
                AuditAction::Authentication,
                TargetEntity::Tenant,
                None,
                "tenant not found for refresh token",
            )
            .await;
            return Err(AuthError::InvalidOperation("tenant not found".to_string()));
        };

        if tenant.client_id != client_id {
            self.audit_failure(
                Some(&tenant.id),
                None,
                ActorType::Anonymous,
                AuditAction::Authentication,
                TargetEntity::Tenant,
                Some(tenant.id.clone()),
                "unauthorized refresh: client id mismatch",
            )
            .await;
            warn!(tenant_id = %tenant.id, "refresh rejected: client id mismatch");
            return Err(AuthError::Unauthorized("invalid client id".to_string()));
        }

        // The plaintext email for the new access token's claims comes from
        // the mapping store, same as at login.
        let email_mapping = self
            .email_mapping_for(&tenant, None, AuditAction::Authentication)
            .await?;
        let email = decrypt_string(&self.key, &email_mapping.encrypted_original)?;

        let pair = self.issue_pair(&tenant, &email, ip_address).await?;

        // Chain the old token to its successor; from here on any reuse of
        // `token` takes the replay path above.
        let revoked = match self
            .tokens
            .revoke_token(token, ip_address, &pair.refresh_token)
            .await
        {
            Ok(revoked) => revoked,
            Err(e) => {
                self.audit_failure(
                    Some(&tenant.id),
                    None,
                    ActorType::System,
                    AuditAction::Authentication,
                    TargetEntity::Session,
                    Some(stored.id.clone()),
                    &format!("failed to revoke rotated refresh token: {e}"),
                )
                .await;
                return Err(e.into());
            }
        };
        if !revoked {
            warn!(tenant_id = %tenant.id, "rotated refresh token vanished before revocation; chain has a gap");
        }

        self.ledger
            .record(AuditLog::new(
                Some(&tenant.id),
                tenant.email.clone(),
                ActorType::User,
                AuditAction::Authentication,
                TargetEntity::Tenant,
                Some(tenant.id.clone()),
                action_details("Tenant session refreshed via refresh token"),
                true,
            ))
            .await;
        info!(tenant_id = %tenant.id, "refresh token rotated");

        Ok(pair)
    }

    /// Issues a fresh access/refresh pair and persists the refresh token.
    async fn issue_pair(
        &self,
        tenant: &Tenant,
        email: &str,
        ip_address: &str,
    ) -> AuthResult<TokenPair> {
        let access_token = issue_access_token(&self.config, tenant, email)?;
        let refresh_value = generate_refresh_token();
        let now = Utc::now();

        if let Err(e) = self
            .tokens
            .insert_token(RefreshToken {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant.id.clone(),
                token: refresh_value.clone(),
                created_at: now,
                expires_at: now + Duration::minutes(self.config.refresh_token_ttl_minutes),
                created_by_ip: ip_address.to_string(),
                is_revoked: false,
                revoked_at: None,
                revoked_by_ip: None,
                replaced_by_token: None,
            })
            .await
        {
            self.audit_failure(
                Some(&tenant.id),
                None,
                ActorType::System,
                AuditAction::Authentication,
                TargetEntity::Session,
                None,
                &format!("failed to persist refresh token: {e}"),
            )
            .await;
            return Err(e.into());
        }

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_value,
        })
    }

    /// Fetches the tenant's Email mapping, auditing the failure when the
    /// mapping is absent or the store errors.
    async fn email_mapping_for(
        &self,
        tenant: &Tenant,
        supplied_email: Option<&str>,
        action: AuditAction,
    ) -> AuthResult<PseudonymMapping> {
        let mappings = match self
            .mappings
            .mappings_for_tenant(&tenant.id, Some(FieldKind::Email))
            .await
        {
            Ok(mappings) => mappings,
            Err(e) => {
                self.audit_failure(
                    Some(&tenant.id),
                    supplied_email,
                    ActorType::System,
                    action,
                    TargetEntity::Tenant,
                    Some(tenant.id.clone()),
                    &format!("failed to load email mapping: {e}"),
                )
                .await;
                return Err(e.into());
            }
        };

        match mappings.into_iter().next() {
            Some(mapping) => Ok(mapping),
            None => {
                self.audit_failure(
                    Some(&tenant.id),
                    supplied_email,
                    ActorType::System,
                    action,
                    TargetEntity::Tenant,
                    Some(tenant.id.clone()),
                    "pseudonym mapping for email not found",
                )
                .await;
                warn!(tenant_id = %tenant.id, "email mapping missing");
                Err(AuthError::InvalidOperation(
                    "pseudonym mapping for email not found".to_string(),
                ))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn audit_failure(
        &self,
        tenant_id: Option<&str>,
        performed_by: Option<&str>,
        actor_type: ActorType,
        action: AuditAction,
        target_entity: TargetEntity,
        target_entity_id: Option<String>,
        error: &str,
    ) {
        self.ledger
            .record(AuditLog::new(
                tenant_id,
                pseudonymize_performer(performed_by, actor_type),
                actor_type,
                action,
                target_entity,
                target_entity_id,
                error_details(error),
                false,
            ))
            .await;
    }
}

fn validate_registration(request: &RegisterTenantRequest) -> Result<(), String> {
    if request.full_name.is_empty() {
        return Err("full name must not be empty".to_string());
    }
    if request.username.is_empty() {
        return Err("username must not be empty".to_string());
    }
    if !is_valid_email(&request.email) {
        return Err("email does not have a valid format".to_string());
    }
    if request.password.len() < 8 {
        return Err("password must be at least 8 characters".to_string());
    }
    if request.password != request.confirm_password {
        return Err("passwords do not match".to_string());
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format_validation() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("jane.doe@sub.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("a@.com"));
    }
}
