//! Storage ports for the gdprkit core and an in-memory reference store.
//!
//! The core treats persistence as an external document-store collaborator:
//! insert-one, atomic insert-many, find-by-filter, update-with-filter, and
//! idempotent index creation, always scoped by an explicit tenant filter.
//! Those operations are expressed here as typed async ports per aggregate
//! so filters stay type-safe.
//!
//! [`MemoryStore`] implements every port behind a single `RwLock`, which
//! gives the atomicity the upsert contract requires: concurrent upserts for
//! the same (tenant, field kind) serialize on the write lock and the last
//! writer wins, never producing a duplicate mapping.

mod error;
mod memory;
mod ports;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use ports::{AudienceStore, MappingStore, RefreshTokenStore, TenantStore, TenantUpdate};
