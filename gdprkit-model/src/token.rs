//! Refresh tokens and issued token pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A session-continuation credential.
///
/// Single-use for rotation: once exchanged it is marked revoked and
/// `replaced_by_token` points at its successor, forming a forward chain.
/// A revoked or expired token must never yield a new pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: String,
    pub tenant_id: String,
    /// Opaque base64 of 64 random bytes, unique across all tenants.
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_by_ip: String,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by_ip: Option<String>,
    pub replaced_by_token: Option<String>,
}

impl RefreshToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Active means usable for rotation: not revoked and not expired.
    pub fn is_active(&self) -> bool {
        !self.is_revoked && !self.is_expired()
    }
}

/// An access token and the refresh token that continues its session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_token(expires_in_secs: i64, revoked: bool) -> RefreshToken {
        RefreshToken {
            id: "t1".to_string(),
            tenant_id: "tenant".to_string(),
            token: "opaque".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
            created_by_ip: "127.0.0.1".to_string(),
            is_revoked: revoked,
            revoked_at: None,
            revoked_by_ip: None,
            replaced_by_token: None,
        }
    }

    #[test]
    fn active_when_fresh() {
        assert!(make_token(60, false).is_active());
    }

    #[test]
    fn inactive_when_expired() {
        let t = make_token(-1, false);
        assert!(t.is_expired());
        assert!(!t.is_active());
    }

    #[test]
    fn inactive_when_revoked() {
        assert!(!make_token(60, true).is_active());
    }
}
