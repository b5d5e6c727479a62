//! Whole-file backup and restore of the store

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};

/// Copy the store file to a timestamped `tasks_backup_<YYYYMMDD_HHMMSS>.db`
/// under `backup_dir`. The write-ahead log is checkpointed first so the
/// copy is self-contained.
pub fn create_backup(db: &Database, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir)?;
    db.checkpoint()?;

    let name = format!("tasks_backup_{}.db", Local::now().format("%Y%m%d_%H%M%S"));
    let backup_path = backup_dir.join(name);
    fs::copy(db.path(), &backup_path)?;
    info!(path = %backup_path.display(), "backup created");
    Ok(backup_path)
}

/// Replace the live store with a backup. The backup is verified before
/// anything is touched; the live handle is consumed and closed, the file
/// swapped, and the store reopened, which re-runs the migration check.
pub fn restore_backup(db: Database, backup_path: &Path) -> Result<Database> {
    verify_backup(backup_path)?;

    let store_path = db.path().to_path_buf();
    db.close()?;

    // Stale WAL side files would shadow the restored contents.
    for suffix in ["-wal", "-shm"] {
        let side = PathBuf::from(format!("{}{}", store_path.display(), suffix));
        if side.exists() {
            fs::remove_file(&side)?;
        }
    }
    fs::copy(backup_path, &store_path)?;
    info!(path = %backup_path.display(), "store restored from backup");

    Database::open(&store_path)
}

/// A corrupt backup is fatal for the whole restore, so check it reads as a
/// consistent SQLite store before replacing anything.
fn verify_backup(backup_path: &Path) -> Result<()> {
    let conn = Connection::open_with_flags(backup_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| unreadable(backup_path, &e))?;
    let verdict: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .map_err(|e| unreadable(backup_path, &e))?;
    if verdict != "ok" {
        return Err(Error::Backup(format!(
            "backup {} failed integrity check: {}",
            backup_path.display(),
            verdict
        )));
    }
    Ok(())
}

fn unreadable(backup_path: &Path, source: &dyn std::fmt::Display) -> Error {
    Error::Backup(format!(
        "backup {} is not a readable store: {}",
        backup_path.display(),
        source
    ))
}
