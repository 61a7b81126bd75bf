//! Access-token issuance and opaque refresh-token generation.

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gdprkit_model::Tenant;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Tenant id.
    pub sub: String,
    /// Original (plaintext) email, recovered via the mapping at login.
    pub email: String,
    pub username: String,
    pub role: String,
    /// Tenant-scope claim; duplicates `sub` for middleware that filters on it.
    pub tenant_id: String,
    pub account_type: String,
    pub exp: usize,
}

/// Issues a signed short-lived access token for an authenticated tenant.
pub fn issue_access_token(config: &AuthConfig, tenant: &Tenant, email: &str) -> AuthResult<String> {
    let expiration = chrono::Utc::now()
        + chrono::Duration::minutes(config.access_token_ttl_minutes);

    let claims = AccessTokenClaims {
        sub: tenant.id.clone(),
        email: email.to_string(),
        username: tenant.username.clone(),
        role: tenant.role.to_string(),
        tenant_id: tenant.id.clone(),
        account_type: tenant.account_type.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
    .map_err(|e| AuthError::Token(e.to_string()))
}

/// Decodes and validates an access token's signature and expiry.
pub fn decode_access_token(config: &AuthConfig, token: &str) -> AuthResult<AccessTokenClaims> {
    decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::Unauthorized(format!("invalid access token: {e}")))
}

/// Generates an opaque refresh token: base64 of 64 random bytes.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 64];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_unique_and_64_bytes() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(BASE64.decode(&a).unwrap().len(), 64);
    }
}
