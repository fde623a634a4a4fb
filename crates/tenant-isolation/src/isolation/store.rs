use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::tenant::{RecordId, TenantId};

/// Address of a row: owning table plus primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub table: &'static str,
    pub id: RecordId,
}

impl RowKey {
    pub fn new(table: &'static str, id: RecordId) -> Self {
        Self { table, id }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table, self.id)
    }
}

/// Tenant linkage persisted with every row: either the organization itself or the parent row
/// through which the organization is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLink {
    Tenant(TenantId),
    Parent(RowKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub link: RowLink,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert { key: RowKey, row: StoredRow },
    Replace { key: RowKey, row: StoredRow },
    Remove { key: RowKey },
}

/// Ordered set of writes applied atomically by [`RowStore::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Unscoped row storage. Backends know nothing about tenants beyond persisting each row's
/// [`RowLink`]; the isolation layer evaluates policy on top of these primitives.
pub trait RowStore: Send + Sync {
    fn fetch(&self, key: &RowKey) -> Result<Option<StoredRow>, StorageError>;
    fn scan(&self, table: &'static str) -> Result<Vec<(RecordId, StoredRow)>, StorageError>;
    fn children(&self, parent: &RowKey) -> Result<Vec<RowKey>, StorageError>;
    /// Apply every write or none of them.
    fn apply(&self, batch: WriteBatch) -> Result<(), StorageError>;
}

/// Error enumeration for backend failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("duplicate key {0}")]
    DuplicateKey(RowKey),
    #[error("row {0} does not exist")]
    Missing(RowKey),
    #[error("row {key} could not be decoded: {message}")]
    Corrupt { key: RowKey, message: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

type Tables = HashMap<&'static str, BTreeMap<RecordId, StoredRow>>;

/// Process-local backend used by the service and the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all tables, ignoring tenancy. Intended for diagnostics only.
    pub fn row_count(&self) -> Result<usize, StorageError> {
        let tables = self.read()?;
        Ok(tables.values().map(BTreeMap::len).sum())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl RowStore for MemoryStore {
    fn fetch(&self, key: &RowKey) -> Result<Option<StoredRow>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .get(key.table)
            .and_then(|rows| rows.get(&key.id))
            .cloned())
    }

    fn scan(&self, table: &'static str) -> Result<Vec<(RecordId, StoredRow)>, StorageError> {
        let tables = self.read()?;
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().map(|(id, row)| (*id, row.clone())).collect())
            .unwrap_or_default())
    }

    fn children(&self, parent: &RowKey) -> Result<Vec<RowKey>, StorageError> {
        let tables = self.read()?;
        let mut found = Vec::new();
        for (table, rows) in tables.iter() {
            for (id, row) in rows {
                if row.link == RowLink::Parent(*parent) {
                    found.push(RowKey::new(*table, *id));
                }
            }
        }
        found.sort();
        Ok(found)
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        let mut undo: Vec<(RowKey, Option<StoredRow>)> = Vec::with_capacity(batch.len());

        for op in batch.into_ops() {
            if let Err(err) = apply_op(&mut tables, op, &mut undo) {
                for (key, previous) in undo.into_iter().rev() {
                    let rows = tables.entry(key.table).or_default();
                    match previous {
                        Some(row) => {
                            rows.insert(key.id, row);
                        }
                        None => {
                            rows.remove(&key.id);
                        }
                    }
                }
                return Err(err);
            }
        }

        Ok(())
    }
}

fn apply_op(
    tables: &mut Tables,
    op: WriteOp,
    undo: &mut Vec<(RowKey, Option<StoredRow>)>,
) -> Result<(), StorageError> {
    match op {
        WriteOp::Insert { key, row } => {
            let rows = tables.entry(key.table).or_default();
            if rows.contains_key(&key.id) {
                return Err(StorageError::DuplicateKey(key));
            }
            rows.insert(key.id, row);
            undo.push((key, None));
        }
        WriteOp::Replace { key, row } => {
            let rows = tables.entry(key.table).or_default();
            match rows.insert(key.id, row) {
                Some(previous) => undo.push((key, Some(previous))),
                None => {
                    rows.remove(&key.id);
                    return Err(StorageError::Missing(key));
                }
            }
        }
        WriteOp::Remove { key } => {
            // Already gone is fine: a concurrent cascade may have removed it first.
            if let Some(previous) = tables.get_mut(key.table).and_then(|rows| rows.remove(&key.id))
            {
                undo.push((key, Some(previous)));
            }
        }
    }
    Ok(())
}
