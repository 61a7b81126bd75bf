//! Tenant records and request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account tier for a tenant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Basic,
    Premium,
}

/// Role of the tenant user within the organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantRole {
    Owner,
    Admin,
    Member,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for TenantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A tenant as persisted.
///
/// `full_name` and `email` hold pseudonymization hashes, never plaintext.
/// `client_id` is the out-of-band shared secret the authorization gate
/// compares against on every tenant-scoped operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    /// Hash of the full name.
    pub full_name: String,
    /// Hash of the email address.
    pub email: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub username: String,
    pub account_type: AccountType,
    pub role: TenantRole,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub website_url: Option<String>,
    /// Tracks the original account-creation request.
    pub account_request_id: String,
    pub consent_accepted: bool,
    pub consent_accepted_at: DateTime<Utc>,
    /// When the record becomes eligible for deletion (storage limitation).
    /// Enforcement is an external retention job.
    pub retention_expiry: Option<DateTime<Utc>>,
    pub client_id: String,
}

/// Registration input supplied by the external caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterTenantRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub website_url: Option<String>,
    pub consent_accepted: bool,
}

/// Partial update input; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateTenantRequest {
    pub username: Option<String>,
    pub website_url: Option<String>,
    /// Replacing the full name re-hashes the stored value and remaps its
    /// pseudonym mapping.
    pub full_name: Option<String>,
}

/// Tenant data returned to an authorized caller, with originals recovered
/// from the pseudonym mappings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TenantProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub account_type: AccountType,
    pub role: TenantRole,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub website_url: Option<String>,
    pub account_request_id: String,
    pub consent_accepted: bool,
    pub consent_accepted_at: DateTime<Utc>,
    pub retention_expiry: Option<DateTime<Utc>>,
}
