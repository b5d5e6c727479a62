//! Versioned schema migrations
//!
//! Each schema change is a numbered step. On open, any step newer than the
//! store's recorded version runs inside its own transaction and is recorded
//! in `schema_version`; a failing step rolls back and aborts the open.
//!
//! ## Migration strategy
//!
//! When the schema changes:
//! 1. Add a new step function (e.g. `migrate_v3_...`)
//! 2. Append it to `STEPS` with the next version number
//! 3. Bump `SCHEMA_VERSION` and add tests for the new path
//!
//! Steps are written to be idempotent (guarded `CREATE TABLE IF NOT
//! EXISTS`, column adds checked against `pragma table_info`) so a store
//! that predates version tracking can still be adopted safely.
//!
//! ## Current versions
//!
//! - **Version 1**: minimal schema: tasks with id, description, completed
//! - **Version 2**: priority, category, due date and timestamp columns on
//!   tasks, the categories table with its seeded `General` row, and the
//!   query indexes

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{Connection, Transaction};
use tracing::info;

use crate::error::{Error, Result};

/// Schema version the code expects. Stores at older versions are upgraded
/// on open.
pub const SCHEMA_VERSION: i64 = 2;

struct Step {
    version: i64,
    apply: fn(&Transaction) -> Result<()>,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        apply: migrate_v1_initial,
    },
    Step {
        version: 2,
        apply: migrate_v2_metadata_and_categories,
    },
];

/// Ensure the version table exists and apply all pending steps in
/// ascending order, each in its own transaction.
pub fn apply_pending(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )?;

    let current = current_version(conn)?;
    for step in STEPS.iter().filter(|s| s.version > current) {
        let tx = conn.transaction()?;
        let applied = (step.apply)(&tx).and_then(|()| record_version(&tx, step.version));
        match applied {
            Ok(()) => tx
                .commit()
                .map_err(|e| migration_error(step.version, &e))?,
            Err(e) => {
                // Dropping the transaction rolls it back.
                drop(tx);
                return Err(migration_error(step.version, &e));
            }
        }
        info!(version = step.version, "schema migration applied");
    }
    Ok(())
}

/// Highest applied version, or 0 for a fresh store.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

fn record_version(tx: &Transaction, version: i64) -> Result<()> {
    tx.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![version, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn migration_error(version: i64, source: &dyn std::fmt::Display) -> Error {
    Error::Migration {
        version,
        message: source.to_string(),
    }
}

fn migrate_v1_initial(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0
        )",
    )?;
    Ok(())
}

fn migrate_v2_metadata_and_categories(tx: &Transaction) -> Result<()> {
    // Column adds fill existing rows with the declared default.
    let columns = table_columns(tx, "tasks")?;
    if !columns.contains("priority") {
        tx.execute_batch("ALTER TABLE tasks ADD COLUMN priority TEXT NOT NULL DEFAULT 'Medium'")?;
    }
    if !columns.contains("category") {
        tx.execute_batch("ALTER TABLE tasks ADD COLUMN category TEXT NOT NULL DEFAULT 'General'")?;
    }
    if !columns.contains("due_date") {
        tx.execute_batch("ALTER TABLE tasks ADD COLUMN due_date TEXT")?;
    }
    if !columns.contains("created_at") {
        tx.execute_batch("ALTER TABLE tasks ADD COLUMN created_at TEXT")?;
    }
    if !columns.contains("updated_at") {
        tx.execute_batch("ALTER TABLE tasks ADD COLUMN updated_at TEXT")?;
    }
    if !columns.contains("completed_at") {
        tx.execute_batch("ALTER TABLE tasks ADD COLUMN completed_at TEXT")?;
    }

    // Rows that predate timestamp tracking get the migration time.
    let now = Utc::now().to_rfc3339();
    tx.execute(
        "UPDATE tasks SET created_at = ?1 WHERE created_at IS NULL",
        [&now],
    )?;
    tx.execute(
        "UPDATE tasks SET updated_at = ?1 WHERE updated_at IS NULL",
        [&now],
    )?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            description TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed);
        CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category);
        CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
        CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);",
    )?;
    tx.execute(
        "INSERT OR IGNORE INTO categories (name, description) VALUES (?1, ?2)",
        rusqlite::params![
            crate::model::DEFAULT_CATEGORY,
            "Default category for uncategorized tasks"
        ],
    )?;
    Ok(())
}

fn table_columns(tx: &Transaction, table: &str) -> Result<HashSet<String>> {
    let mut stmt = tx.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(columns)
}
