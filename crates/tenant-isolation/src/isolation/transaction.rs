use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde_json::Value;
use tracing::{debug, warn};

use super::context::TenantContext;
use super::entity::{Ownership, TenantScoped};
use super::error::IsolationError;
use super::policy::{OwnershipLookup, RowPolicy};
use super::store::{RowKey, RowLink, RowStore, StorageError, StoredRow, WriteBatch, WriteOp};
use super::tenant::{AuthError, RecordId, TenantId};

/// Unit of work against a [`RowStore`] evaluated under one tenant context.
///
/// Writes are buffered with read-your-writes semantics and reach the backend as a single
/// [`WriteBatch`] on commit. Every operation evaluates the row policy; nothing here trusts
/// the caller to filter.
pub struct Transaction<'s, S: RowStore + ?Sized> {
    store: &'s S,
    context: TenantContext,
    overlay: BTreeMap<RowKey, Option<StoredRow>>,
    batch: WriteBatch,
}

impl<'s, S: RowStore + ?Sized> Transaction<'s, S> {
    pub(crate) fn begin(store: &'s S, context: TenantContext) -> Self {
        Self {
            store,
            context,
            overlay: BTreeMap::new(),
            batch: WriteBatch::default(),
        }
    }

    /// Override the tenant for the rest of this transaction only.
    pub fn set_local_tenant(&mut self, tenant: TenantId) {
        self.context.set_current_tenant(tenant);
    }

    pub fn current_tenant(&self) -> Result<TenantId, AuthError> {
        self.context.current_tenant()
    }

    pub fn pending_writes(&self) -> usize {
        self.batch.len()
    }

    pub fn insert<T: TenantScoped>(&mut self, mut record: T) -> Result<T, IsolationError> {
        let policy = self.policy()?;
        let row = self.prepare_write(&policy, &mut record)?;
        let key = record.row_key();
        if self.row(&key)?.is_some() {
            return Err(IsolationError::Conflict {
                table: T::TABLE,
                id: key.id,
            });
        }
        self.stage(WriteOp::Insert { key, row });
        Ok(record)
    }

    /// Insert unless the primary key is already taken, in which case nothing is written.
    pub fn insert_or_ignore<T: TenantScoped>(
        &mut self,
        mut record: T,
    ) -> Result<Option<T>, IsolationError> {
        let policy = self.policy()?;
        let row = self.prepare_write(&policy, &mut record)?;
        let key = record.row_key();
        if let Some(existing) = self.row(&key)? {
            // Only a row the caller can already see is skipped; anyone else's key is taken.
            if !policy.is_visible(self, &existing.link)? {
                return Err(IsolationError::Conflict {
                    table: T::TABLE,
                    id: key.id,
                });
            }
            debug!(table = T::TABLE, id = %key.id, "insert skipped on existing key");
            return Ok(None);
        }
        self.stage(WriteOp::Insert { key, row });
        Ok(Some(record))
    }

    pub fn find<T: TenantScoped>(&self, id: RecordId) -> Result<Option<T>, IsolationError> {
        let policy = self.policy()?;
        let key = RowKey::new(T::TABLE, id);
        match self.visible_row(&policy, &key)? {
            Some(row) => Ok(Some(decode(key, row.payload)?)),
            None => Ok(None),
        }
    }

    pub fn get<T: TenantScoped>(&self, id: RecordId) -> Result<T, IsolationError> {
        self.find::<T>(id)?
            .ok_or(IsolationError::NotFoundOrForbidden { table: T::TABLE, id })
    }

    pub fn select<T: TenantScoped>(&self) -> Result<Vec<T>, IsolationError> {
        self.select_where(|_: &T| true)
    }

    pub fn select_where<T, F>(&self, mut predicate: F) -> Result<Vec<T>, IsolationError>
    where
        T: TenantScoped,
        F: FnMut(&T) -> bool,
    {
        let policy = self.policy()?;
        let mut visible = Vec::new();
        for (id, row) in self.rows(T::TABLE)? {
            if !policy.is_visible(self, &row.link)? {
                continue;
            }
            let record: T = decode(RowKey::new(T::TABLE, id), row.payload)?;
            if predicate(&record) {
                visible.push(record);
            }
        }
        Ok(visible)
    }

    pub fn count<T: TenantScoped>(&self) -> Result<usize, IsolationError> {
        Ok(self.select::<T>()?.len())
    }

    /// Replace a visible record. The owning tenant is immutable: a replacement that would
    /// resolve elsewhere, directly or through a new parent, is rejected.
    pub fn update<T: TenantScoped>(&mut self, mut record: T) -> Result<T, IsolationError> {
        let policy = self.policy()?;
        let key = record.row_key();
        if self.visible_row(&policy, &key)?.is_none() {
            return Err(IsolationError::NotFoundOrForbidden {
                table: T::TABLE,
                id: key.id,
            });
        }
        let row = self.prepare_write(&policy, &mut record)?;
        self.stage(WriteOp::Replace { key, row });
        Ok(record)
    }

    /// Delete a visible record and every row owned through it. Returns the rows removed.
    pub fn delete<T: TenantScoped>(&mut self, id: RecordId) -> Result<usize, IsolationError> {
        let policy = self.policy()?;
        let key = RowKey::new(T::TABLE, id);
        if self.visible_row(&policy, &key)?.is_none() {
            return Err(IsolationError::NotFoundOrForbidden { table: T::TABLE, id });
        }
        Ok(self.remove_cascade(key)?)
    }

    pub fn delete_where<T, F>(&mut self, predicate: F) -> Result<usize, IsolationError>
    where
        T: TenantScoped,
        F: FnMut(&T) -> bool,
    {
        let targets: Vec<RowKey> = self
            .select_where::<T, _>(predicate)?
            .iter()
            .map(TenantScoped::row_key)
            .collect();

        let mut removed = 0;
        for key in targets {
            if self.row(&key)?.is_some() {
                removed += self.remove_cascade(key)?;
            }
        }
        Ok(removed)
    }

    pub(crate) fn commit(self) -> Result<usize, IsolationError> {
        let writes = self.batch.len();
        if writes > 0 {
            self.store.apply(self.batch)?;
            debug!(
                writes,
                tenant = ?self.context.current_tenant().ok(),
                "transaction committed"
            );
        }
        Ok(writes)
    }

    pub(crate) fn rollback(self) {
        if !self.batch.is_empty() {
            debug!(discarded = self.batch.len(), "transaction rolled back");
        }
    }

    fn policy(&self) -> Result<RowPolicy, IsolationError> {
        Ok(RowPolicy::for_context(&self.context)?)
    }

    fn prepare_write<T: TenantScoped>(
        &self,
        policy: &RowPolicy,
        record: &mut T,
    ) -> Result<StoredRow, IsolationError> {
        if let Ownership::Organization(None) = record.ownership() {
            record.assign_organization(policy.tenant());
        }
        let link = record
            .ownership()
            .to_link()
            .ok_or(IsolationError::TenantMismatch { table: T::TABLE })?;
        policy.check_write(self, T::TABLE, &link)?;
        for (table, id) in record.references() {
            if self.visible_row(policy, &RowKey::new(table, id))?.is_none() {
                warn!(
                    table = T::TABLE,
                    referenced = table,
                    "write references a row outside the tenant"
                );
                return Err(IsolationError::TenantMismatch { table: T::TABLE });
            }
        }
        let payload = serde_json::to_value(&*record).map_err(|err| StorageError::Corrupt {
            key: record.row_key(),
            message: err.to_string(),
        })?;
        Ok(StoredRow { link, payload })
    }

    fn row(&self, key: &RowKey) -> Result<Option<StoredRow>, StorageError> {
        match self.overlay.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.store.fetch(key),
        }
    }

    fn visible_row(
        &self,
        policy: &RowPolicy,
        key: &RowKey,
    ) -> Result<Option<StoredRow>, StorageError> {
        match self.row(key)? {
            Some(row) if policy.is_visible(self, &row.link)? => Ok(Some(row)),
            _ => Ok(None),
        }
    }

    fn rows(&self, table: &'static str) -> Result<Vec<(RecordId, StoredRow)>, StorageError> {
        let mut rows: BTreeMap<RecordId, StoredRow> =
            self.store.scan(table)?.into_iter().collect();
        for (key, staged) in self.overlay.iter().filter(|(key, _)| key.table == table) {
            match staged {
                Some(row) => {
                    rows.insert(key.id, row.clone());
                }
                None => {
                    rows.remove(&key.id);
                }
            }
        }
        Ok(rows.into_iter().collect())
    }

    fn child_keys(&self, parent: &RowKey) -> Result<Vec<RowKey>, StorageError> {
        let mut found: BTreeSet<RowKey> = self
            .store
            .children(parent)?
            .into_iter()
            .filter(|key| !self.overlay.contains_key(key))
            .collect();
        for (key, staged) in &self.overlay {
            if let Some(row) = staged {
                if row.link == RowLink::Parent(*parent) {
                    found.insert(*key);
                }
            }
        }
        Ok(found.into_iter().collect())
    }

    fn remove_cascade(&mut self, root: RowKey) -> Result<usize, StorageError> {
        let mut doomed = Vec::new();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(key) = queue.pop_front() {
            if !seen.insert(key) {
                continue;
            }
            doomed.push(key);
            queue.extend(self.child_keys(&key)?);
        }

        for key in doomed.iter().rev() {
            self.stage(WriteOp::Remove { key: *key });
        }
        Ok(doomed.len())
    }

    fn stage(&mut self, op: WriteOp) {
        match &op {
            WriteOp::Insert { key, row } | WriteOp::Replace { key, row } => {
                self.overlay.insert(*key, Some(row.clone()));
            }
            WriteOp::Remove { key } => {
                self.overlay.insert(*key, None);
            }
        }
        self.batch.push(op);
    }
}

impl<'s, S: RowStore + ?Sized> OwnershipLookup for Transaction<'s, S> {
    fn link_of(&self, key: &RowKey) -> Result<Option<RowLink>, StorageError> {
        match self.overlay.get(key) {
            Some(staged) => Ok(staged.as_ref().map(|row| row.link)),
            None => Ok(self.store.fetch(key)?.map(|row| row.link)),
        }
    }
}

fn decode<T: TenantScoped>(key: RowKey, payload: Value) -> Result<T, StorageError> {
    serde_json::from_value(payload).map_err(|err| StorageError::Corrupt {
        key,
        message: err.to_string(),
    })
}
