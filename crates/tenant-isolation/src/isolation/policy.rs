//! Row isolation predicate.
//!
//! A row is admitted when its resolved owner equals the session tenant. Directly scoped rows
//! carry the owner; indirectly scoped rows are resolved by following parent references until a
//! directly scoped ancestor is reached. Anything that fails to resolve is treated as foreign.

use tracing::warn;

use super::context::TenantContext;
use super::error::IsolationError;
use super::store::{RowKey, RowLink, StorageError};
use super::tenant::{AuthError, TenantId};

/// Longest parent chain followed before a row is considered unresolvable.
pub const MAX_OWNERSHIP_DEPTH: usize = 16;

/// Lookup of the persisted linkage of a row, regardless of tenant.
pub trait OwnershipLookup {
    fn link_of(&self, key: &RowKey) -> Result<Option<RowLink>, StorageError>;
}

/// Follow `link` to the owning organization. `None` for broken, cyclic, or overly deep chains.
pub fn resolve_owner<L>(lookup: &L, link: &RowLink) -> Result<Option<TenantId>, StorageError>
where
    L: OwnershipLookup + ?Sized,
{
    let mut current = *link;
    for _ in 0..=MAX_OWNERSHIP_DEPTH {
        match current {
            RowLink::Tenant(tenant) => return Ok(Some(tenant)),
            RowLink::Parent(parent) => match lookup.link_of(&parent)? {
                Some(next) => current = next,
                None => return Ok(None),
            },
        }
    }
    Ok(None)
}

/// Predicate bound to one session tenant. Constructing it is the point where an unset
/// context fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPolicy {
    tenant: TenantId,
}

impl RowPolicy {
    pub fn for_context(context: &TenantContext) -> Result<Self, AuthError> {
        context.current_tenant().map(|tenant| Self { tenant })
    }

    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    pub fn admits(&self, owner: Option<TenantId>) -> bool {
        owner == Some(self.tenant)
    }

    /// Read-side filter (`USING`): invisible rows are skipped, never reported.
    pub fn is_visible<L>(&self, lookup: &L, link: &RowLink) -> Result<bool, StorageError>
    where
        L: OwnershipLookup + ?Sized,
    {
        Ok(self.admits(resolve_owner(lookup, link)?))
    }

    /// Write-side check (`WITH CHECK`): the proposed row must resolve to the session tenant.
    pub fn check_write<L>(
        &self,
        lookup: &L,
        table: &'static str,
        link: &RowLink,
    ) -> Result<(), IsolationError>
    where
        L: OwnershipLookup + ?Sized,
    {
        if self.is_visible(lookup, link)? {
            return Ok(());
        }
        warn!(table, tenant = %self.tenant, "write rejected by tenant isolation policy");
        Err(IsolationError::TenantMismatch { table })
    }
}
