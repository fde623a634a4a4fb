use std::sync::Arc;

use super::context::TenantContext;
use super::entity::TenantScoped;
use super::error::IsolationError;
use super::store::RowStore;
use super::tenant::{AuthError, RecordId, TenantId};
use super::transaction::Transaction;

/// A storage session. The tenant context lives here and is handed to every transaction the
/// connection opens; single statements run as autocommit transactions.
pub struct Connection<S: RowStore> {
    id: usize,
    store: Arc<S>,
    context: TenantContext,
}

impl<S: RowStore> Connection<S> {
    pub fn new(id: usize, store: Arc<S>) -> Self {
        Self {
            id,
            store,
            context: TenantContext::unset(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    pub fn set_current_tenant(&mut self, tenant: TenantId) {
        self.context.set_current_tenant(tenant);
    }

    pub fn set_current_tenant_str(&mut self, raw: &str) -> Result<TenantId, AuthError> {
        self.context.set_current_tenant_str(raw)
    }

    pub fn current_tenant(&self) -> Result<TenantId, AuthError> {
        self.context.current_tenant()
    }

    pub fn clear_tenant(&mut self) {
        self.context.clear();
    }

    /// Run `work` in a transaction. `Ok` commits every buffered write atomically; `Err`
    /// discards them.
    pub fn transaction<F, R, E>(&self, work: F) -> Result<R, E>
    where
        F: FnOnce(&mut Transaction<'_, S>) -> Result<R, E>,
        E: From<IsolationError>,
    {
        let mut tx = Transaction::begin(&*self.store, self.context.clone());
        match work(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }

    pub fn insert<T: TenantScoped>(&self, record: T) -> Result<T, IsolationError> {
        self.transaction(|tx| tx.insert(record))
    }

    pub fn insert_or_ignore<T: TenantScoped>(&self, record: T) -> Result<Option<T>, IsolationError> {
        self.transaction(|tx| tx.insert_or_ignore(record))
    }

    pub fn find<T: TenantScoped>(&self, id: RecordId) -> Result<Option<T>, IsolationError> {
        self.transaction(|tx| tx.find(id))
    }

    pub fn get<T: TenantScoped>(&self, id: RecordId) -> Result<T, IsolationError> {
        self.transaction(|tx| tx.get(id))
    }

    pub fn select<T: TenantScoped>(&self) -> Result<Vec<T>, IsolationError> {
        self.transaction(|tx| tx.select())
    }

    pub fn select_where<T, F>(&self, predicate: F) -> Result<Vec<T>, IsolationError>
    where
        T: TenantScoped,
        F: FnMut(&T) -> bool,
    {
        self.transaction(|tx| tx.select_where(predicate))
    }

    pub fn count<T: TenantScoped>(&self) -> Result<usize, IsolationError> {
        self.transaction(|tx| tx.count::<T>())
    }

    pub fn update<T: TenantScoped>(&self, record: T) -> Result<T, IsolationError> {
        self.transaction(|tx| tx.update(record))
    }

    pub fn delete<T: TenantScoped>(&self, id: RecordId) -> Result<usize, IsolationError> {
        self.transaction(|tx| tx.delete::<T>(id))
    }

    pub fn delete_where<T, F>(&self, predicate: F) -> Result<usize, IsolationError>
    where
        T: TenantScoped,
        F: FnMut(&T) -> bool,
    {
        self.transaction(|tx| tx.delete_where(predicate))
    }
}
