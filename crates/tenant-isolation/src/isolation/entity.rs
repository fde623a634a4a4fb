use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::{RowKey, RowLink};
use super::tenant::{RecordId, TenantId};

/// How a record reaches its owning organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Directly scoped. `None` means the record relies on the session tenant and is stamped
    /// on write.
    Organization(Option<TenantId>),
    /// Indirectly scoped through the referenced parent row.
    Parent { table: &'static str, id: RecordId },
}

impl Ownership {
    pub(crate) fn to_link(self) -> Option<RowLink> {
        match self {
            Ownership::Organization(tenant) => tenant.map(RowLink::Tenant),
            Ownership::Parent { table, id } => Some(RowLink::Parent(RowKey::new(table, id))),
        }
    }
}

/// A record persisted in a tenant-scoped table.
pub trait TenantScoped: Serialize + DeserializeOwned + Clone + Send + 'static {
    const TABLE: &'static str;

    fn record_id(&self) -> RecordId;

    /// Resolve-owning-tenant capability: the explicit reference the policy follows.
    fn ownership(&self) -> Ownership;

    /// Stamp the owning organization on a directly scoped record. Indirect records ignore it.
    fn assign_organization(&mut self, _tenant: TenantId) {}

    /// Rows this record points at besides its owner. Each must be visible to the writer.
    fn references(&self) -> Vec<(&'static str, RecordId)> {
        Vec::new()
    }

    fn row_key(&self) -> RowKey {
        RowKey::new(Self::TABLE, self.record_id())
    }
}
