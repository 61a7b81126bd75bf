//! Credential and token lifecycle.
//!
//! Gates all access to tenant data:
//! - registration stores only hashed PII plus encrypted-original mappings
//!   and a salted password digest
//! - authentication looks a tenant up by hashed email, then decrypts the
//!   email mapping and compares it with the supplied plaintext — a tamper
//!   failure there fails authentication hard, never falling back to the
//!   hash-only match
//! - refresh tokens are single-use: each exchange revokes the old token and
//!   chains it to its successor, so replay of a rotated token is detected
//!   and rejected
//!
//! Every path, success or failure, records an audit entry before returning.

mod config;
mod error;
mod service;
mod token;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use service::AuthService;
pub use token::{decode_access_token, generate_refresh_token, AccessTokenClaims};
