//! Auth configuration.

use serde::{Deserialize, Serialize};

/// Configuration for token issuance and retention.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    pub token_secret: String,

    /// Access token lifetime in minutes.
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in minutes.
    pub refresh_token_ttl_minutes: i64,

    /// Tenant and mapping retention window in days.
    pub retention_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: "gdprkit-dev-secret-change-in-production".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_minutes: 30,
            retention_days: 365 * 5,
        }
    }
}
