//! Domain types for the gdprkit core.
//!
//! Identifying values (`email`, `full_name`) on a stored [`Tenant`] are
//! always hash outputs, never plaintext; the originals live only in
//! [`PseudonymMapping`] records as authenticated ciphertext. The type split
//! between [`TenantAudience`] (plaintext, caller-facing) and
//! [`EncryptedAudienceRecord`] (stored form) keeps unencrypted detail
//! values out of storage by construction.

mod audience;
mod mapping;
mod tenant;
mod token;

pub use audience::{AudienceDetails, EncryptedAudienceRecord, TenantAudience};
pub use mapping::{FieldKind, PseudonymMapping};
pub use tenant::{
    AccountType, RegisterTenantRequest, Tenant, TenantProfile, TenantRole, UpdateTenantRequest,
};
pub use token::{RefreshToken, TokenPair};
