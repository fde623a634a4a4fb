use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::connection::Connection;
use super::store::RowStore;

/// Fixed-size pool of storage connections.
///
/// A connection is handed out with no tenant set and its tenant context is cleared when the
/// handle is dropped, so a context never survives into the next checkout.
pub struct ConnectionPool<S: RowStore> {
    store: Arc<S>,
    idle: Arc<Mutex<Vec<Connection<S>>>>,
    size: usize,
}

impl<S: RowStore> Clone for ConnectionPool<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            idle: Arc::clone(&self.idle),
            size: self.size,
        }
    }
}

impl<S: RowStore> ConnectionPool<S> {
    pub fn new(store: Arc<S>, size: usize) -> Self {
        let size = size.max(1);
        let idle = (0..size)
            .rev()
            .map(|id| Connection::new(id, Arc::clone(&store)))
            .collect();
        Self {
            store,
            idle: Arc::new(Mutex::new(idle)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    /// Check out a connection without waiting.
    pub fn acquire(&self) -> Result<PooledConnection<S>, PoolError> {
        let mut idle = self.idle.lock().map_err(|_| PoolError::Poisoned)?;
        let connection = idle.pop().ok_or(PoolError::Exhausted { size: self.size })?;
        debug!(connection = connection.id(), "connection acquired");
        Ok(PooledConnection {
            connection: Some(connection),
            idle: Arc::clone(&self.idle),
        })
    }
}

/// Checked-out connection; returns to the pool with a cleared tenant on drop.
pub struct PooledConnection<S: RowStore> {
    connection: Option<Connection<S>>,
    idle: Arc<Mutex<Vec<Connection<S>>>>,
}

impl<S: RowStore> Deref for PooledConnection<S> {
    type Target = Connection<S>;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection is present until drop")
    }
}

impl<S: RowStore> DerefMut for PooledConnection<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection is present until drop")
    }
}

impl<S: RowStore> Drop for PooledConnection<S> {
    fn drop(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        connection.clear_tenant();
        let id = connection.id();
        match self.idle.lock() {
            Ok(mut idle) => {
                idle.push(connection);
                debug!(connection = id, "connection released");
            }
            Err(_) => warn!(connection = id, "pool lock poisoned; connection discarded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("all {size} connections are checked out")]
    Exhausted { size: usize },
    #[error("connection pool lock poisoned")]
    Poisoned,
}
