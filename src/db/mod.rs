//! Persistence layer over a local SQLite store
//!
//! [`Database`] owns the store connection and is an explicitly constructed
//! value passed to whoever needs it. Opening a store applies pragmas,
//! ensures the schema-version table exists and runs any pending migrations;
//! a migration failure aborts the open so the application never runs
//! against an unknown schema.

mod categories;
mod migrations;
mod tasks;

pub use migrations::SCHEMA_VERSION;
pub use tasks::{TaskFilter, TaskStatistics};

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, Transaction};
use tracing::info;

use crate::error::{Error, Result};

const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;

/// Handle to the on-disk store. One per process, opened at startup.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Open or create a store at the given path and bring its schema up to
    /// date. Fails if the file cannot be opened or a migration step errors;
    /// no partially applied migration is ever committed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;
        conn.execute_batch(PRAGMAS)?;
        migrations::apply_pending(&mut conn)?;

        info!(path = %path.display(), "store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Open an in-memory store (test support).
    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(PRAGMAS)?;
        migrations::apply_pending(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Path of the backing store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a closure against the connection (reads).
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    /// Run a closure inside a transaction. Commits on success; any error
    /// rolls the whole transaction back, so callers observe either full
    /// success or no change.
    pub fn with_tx<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Flush the write-ahead log into the main store file.
    pub fn checkpoint(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
            Ok(())
        })
    }

    /// Close the connection, surfacing any error.
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().unwrap();
        conn.close().map_err(|(_, e)| Error::Sqlite(e))?;
        info!("store closed");
        Ok(())
    }
}
