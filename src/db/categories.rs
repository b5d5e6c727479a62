//! Category CRUD
//!
//! Categories are keyed by name. The `General` row is seeded at migration
//! time and protected from deletion; deleting any other category moves its
//! tasks to `General` in the same transaction.

use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::model::{Category, DEFAULT_CATEGORY, category};

impl Database {
    /// Validate and insert a category, returning the assigned id.
    pub fn create_category(&self, name: &str, description: Option<&str>) -> Result<i64> {
        category::validate_name(name)?;
        let id = self.with_tx(|tx| {
            let inserted = tx.execute(
                "INSERT INTO categories (name, description) VALUES (?1, ?2)",
                rusqlite::params![name, description],
            );
            match inserted {
                Ok(_) => Ok(tx.last_insert_rowid()),
                Err(e) if is_unique_violation(&e) => {
                    Err(Error::DuplicateCategory(name.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })?;
        info!(name, "category created");
        Ok(id)
    }

    /// All categories ordered by name.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, description FROM categories ORDER BY name")?;
            let categories = stmt
                .query_map([], |row| {
                    Ok(Category {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<Category>>>()?;
            Ok(categories)
        })
    }

    /// Delete a category, reassigning its tasks to `General` first. Both
    /// steps run in one transaction. The `General` category itself cannot
    /// be deleted.
    pub fn delete_category(&self, name: &str) -> Result<()> {
        if name == DEFAULT_CATEGORY {
            return Err(Error::Constraint(format!(
                "the {} category cannot be deleted",
                DEFAULT_CATEGORY
            )));
        }
        let reassigned = self.with_tx(|tx| {
            let found: Option<i64> = tx
                .query_row("SELECT 1 FROM categories WHERE name = ?1", [name], |row| {
                    row.get(0)
                })
                .optional()?;
            if found.is_none() {
                return Err(Error::CategoryNotFound(name.to_string()));
            }
            let reassigned = tx.execute(
                "UPDATE tasks SET category = ?1, updated_at = ?2 WHERE category = ?3",
                rusqlite::params![DEFAULT_CATEGORY, Utc::now().to_rfc3339(), name],
            )?;
            tx.execute("DELETE FROM categories WHERE name = ?1", [name])?;
            Ok(reassigned)
        })?;
        info!(name, reassigned, "category deleted");
        Ok(())
    }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
