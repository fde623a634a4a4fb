use super::store::StorageError;
use super::tenant::{AuthError, RecordId};

/// Errors raised at the storage boundary by tenant-scoped operations.
///
/// These are policy outcomes, not transient faults, and are surfaced to callers unchanged.
#[derive(Debug, thiserror::Error)]
pub enum IsolationError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("row violates the tenant isolation policy of '{table}'")]
    TenantMismatch { table: &'static str },
    #[error("no record {id} in '{table}'")]
    NotFoundOrForbidden { table: &'static str, id: RecordId },
    #[error("record {id} already exists in '{table}'")]
    Conflict { table: &'static str, id: RecordId },
    #[error(transparent)]
    Storage(StorageError),
}

impl IsolationError {
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, Self::Auth(AuthError::AuthenticationRequired))
    }
}

impl From<StorageError> for IsolationError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::DuplicateKey(key) => Self::Conflict {
                table: key.table,
                id: key.id,
            },
            other => Self::Storage(other),
        }
    }
}
