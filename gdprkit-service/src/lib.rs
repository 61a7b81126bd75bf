//! Tenant data and audience orchestration.
//!
//! Both services sit behind the same authorization gate: the tenant must
//! exist, the caller's client id must match the tenant's stored client id,
//! and the tenant must have accepted data-processing consent — checked in
//! that order, with every gate failure audited before the error returns.
//!
//! The tenant service recovers plaintext originals from the pseudonym
//! mappings on read and remaps the FullName mapping on update; the
//! audience service encrypts each JSON-serialized detail value before
//! storage and decrypts on read, normalizing object keys to camelCase.

mod audience;
mod error;
mod gate;
mod tenant;

pub use audience::AudienceService;
pub use error::{ServiceError, ServiceResult};
pub use tenant::{ExportFormat, TenantService};
