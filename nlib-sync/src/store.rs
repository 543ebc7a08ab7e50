//! Shared handle to the catalog database.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction};

use crate::error::SyncError;

/// Cloneable handle to one SQLite connection.
///
/// All database work runs inside synchronous closures, so the connection is
/// never held across an `.await`.
#[derive(Clone)]
pub struct CatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (creating or migrating as needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, SyncError> {
        Ok(Self::new(nlib_db::open_database(path)?))
    }

    pub fn open_memory() -> Result<Self, SyncError> {
        Ok(Self::new(nlib_db::open_memory()?))
    }

    /// Run `f` against the connection outside any explicit transaction.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside one transaction. Any error rolls the whole closure back.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SyncError> {
        self.conn.lock().map_err(|_| SyncError::Poisoned)
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore").finish_non_exhaustive()
    }
}
