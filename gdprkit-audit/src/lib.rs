//! Append-only, tamper-evident audit ledger.
//!
//! Every sensitive operation — success or failure — produces exactly one
//! [`AuditLog`] entry. Each entry is self-certifying: its integrity hash is
//! a SHA-256 digest over a canonical concatenation of every other field, so
//! recomputing it from the stored record either reproduces the stored value
//! or proves tampering.
//!
//! Appends are validated (required fields, no duplicate ids) but recording
//! is best-effort relative to the primary operation: a ledger failure is
//! logged and never replaces or masks the business error that triggered it.

mod error;
mod ledger;
mod record;
mod store;

pub use error::{AuditError, AuditResult};
pub use ledger::{pseudonymize_performer, AuditLedger};
pub use record::{ActorType, AuditAction, AuditLog, TargetEntity};
pub use store::{AuditStore, MemoryAuditStore};
