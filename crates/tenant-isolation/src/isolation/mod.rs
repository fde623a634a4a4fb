//! Tenant isolation layer.
//!
//! Every tenant-owned row is reachable only through a [`Connection`] whose
//! [`TenantContext`] names the calling organization. The [`RowPolicy`] is evaluated on each
//! access against the row's resolved owner, whether stored on the row or derived through its
//! parents, so call sites never repeat the tenant filter.

pub mod connection;
pub mod context;
pub mod entity;
pub mod error;
pub mod policy;
pub mod pool;
pub mod store;
pub mod tenant;
pub mod transaction;

#[cfg(test)]
mod tests;

pub use connection::Connection;
pub use context::TenantContext;
pub use entity::{Ownership, TenantScoped};
pub use error::IsolationError;
pub use policy::{resolve_owner, OwnershipLookup, RowPolicy, MAX_OWNERSHIP_DEPTH};
pub use pool::{ConnectionPool, PoolError, PooledConnection};
pub use store::{MemoryStore, RowKey, RowLink, RowStore, StorageError, StoredRow, WriteBatch, WriteOp};
pub use tenant::{AuthError, RecordId, TenantId};
pub use transaction::Transaction;
