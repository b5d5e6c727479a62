//! Task CRUD and queries

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, ToSql, Transaction};
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::model::task::DATE_FORMAT;
use crate::model::{Priority, Task, TaskDraft, TaskPatch};

const TASK_COLUMNS: &str =
    "id, description, priority, category, due_date, completed, created_at, updated_at, completed_at";

/// Optional restrictions for [`Database::list_tasks`]. All set fields must
/// match; the default filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    /// Case-insensitive substring match on the description.
    pub search: Option<String>,
}

/// Aggregate counts over the task table. Priority and category breakdowns
/// cover open tasks only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStatistics {
    pub total: i64,
    pub completed: i64,
    pub active: i64,
    pub overdue: i64,
    pub by_priority: BTreeMap<Priority, i64>,
    pub by_category: BTreeMap<String, i64>,
}

impl Database {
    /// Validate a draft and insert it, returning the assigned id. The
    /// draft's category must already exist.
    pub fn create_task(&self, draft: &TaskDraft) -> Result<i64> {
        draft.validate()?;
        let id = self.with_tx(|tx| {
            ensure_category_exists(tx, &draft.category)?;
            tx.execute(
                "INSERT INTO tasks (description, priority, category, due_date, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
                rusqlite::params![
                    draft.description,
                    draft.priority.as_str(),
                    draft.category,
                    draft.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;
        info!(id, "task created");
        Ok(id)
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                [id],
                task_from_row,
            )
            .optional()?
            .ok_or(Error::TaskNotFound(id))
        })
    }

    /// List tasks matching the filter, newest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {} FROM tasks", TASK_COLUMNS);
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref category) = filter.category {
            clauses.push("category = ?");
            params.push(Box::new(category.clone()));
        }
        if let Some(priority) = filter.priority {
            clauses.push("priority = ?");
            params.push(Box::new(priority.as_str()));
        }
        if let Some(completed) = filter.completed {
            clauses.push("completed = ?");
            params.push(Box::new(completed));
        }
        if let Some(ref search) = filter.search {
            // SQLite LIKE is case-insensitive for ASCII.
            clauses.push("description LIKE ? ESCAPE '\\'");
            params.push(Box::new(format!("%{}%", escape_like(search))));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(
                    rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                    task_from_row,
                )?
                .collect::<rusqlite::Result<Vec<Task>>>()?;
            Ok(tasks)
        })
    }

    /// Apply a partial update. Rewrites `updated_at`; a `completed`
    /// transition to true stamps `completed_at`, a transition back to
    /// false clears it.
    pub fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<()> {
        patch.validate()?;
        self.with_tx(|tx| {
            let current = tx
                .query_row(
                    &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                    [id],
                    task_from_row,
                )
                .optional()?
                .ok_or(Error::TaskNotFound(id))?;

            if let Some(ref category) = patch.category {
                ensure_category_exists(tx, category)?;
            }

            let now = Utc::now();
            let description = patch.description.as_ref().unwrap_or(&current.description);
            let priority = patch.priority.unwrap_or(current.priority);
            let category = patch.category.as_ref().unwrap_or(&current.category);
            let due_date = match patch.due_date {
                Some(due) => due,
                None => current.due_date,
            };
            let completed = patch.completed.unwrap_or(current.completed);
            let completed_at = match (current.completed, completed) {
                (false, true) => Some(now),
                (true, false) => None,
                _ => current.completed_at,
            };

            tx.execute(
                "UPDATE tasks SET description = ?1, priority = ?2, category = ?3, due_date = ?4,
                        completed = ?5, updated_at = ?6, completed_at = ?7
                 WHERE id = ?8",
                rusqlite::params![
                    description,
                    priority.as_str(),
                    category,
                    due_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    completed,
                    now.to_rfc3339(),
                    completed_at.map(|t| t.to_rfc3339()),
                    id,
                ],
            )?;
            Ok(())
        })?;
        info!(id, "task updated");
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        self.with_tx(|tx| {
            let affected = tx.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(Error::TaskNotFound(id));
            }
            Ok(())
        })?;
        info!(id, "task deleted");
        Ok(())
    }

    /// Aggregate counts: totals plus open-task breakdowns by priority and
    /// category, and the number of overdue open tasks.
    pub fn task_statistics(&self) -> Result<TaskStatistics> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
            let completed: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE completed = 1",
                [],
                |row| row.get(0),
            )?;

            let mut by_priority = BTreeMap::new();
            let mut stmt = conn.prepare(
                "SELECT priority, COUNT(*) FROM tasks WHERE completed = 0 GROUP BY priority",
            )?;
            let rows = stmt.query_map([], |row| {
                let raw: String = row.get(0)?;
                let priority = raw
                    .parse::<Priority>()
                    .map_err(|e| bad_column(0, e))?;
                Ok((priority, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (priority, count) = row?;
                by_priority.insert(priority, count);
            }

            let mut by_category = BTreeMap::new();
            let mut stmt = conn.prepare(
                "SELECT category, COUNT(*) FROM tasks WHERE completed = 0 GROUP BY category",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (category, count) = row?;
                by_category.insert(category, count);
            }

            let today = Local::now().date_naive().format(DATE_FORMAT).to_string();
            let overdue: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks
                 WHERE completed = 0 AND due_date IS NOT NULL AND due_date < ?1",
                [&today],
                |row| row.get(0),
            )?;

            Ok(TaskStatistics {
                total,
                completed,
                active: total - completed,
                overdue,
                by_priority,
                by_category,
            })
        })
    }
}

pub(crate) fn ensure_category_exists(tx: &Transaction, name: &str) -> Result<()> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM categories WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(Error::CategoryNotFound(name.to_string()));
    }
    Ok(())
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority_raw: String = row.get(2)?;
    let priority = priority_raw
        .parse::<Priority>()
        .map_err(|e| bad_column(2, e))?;
    let due_date = row
        .get::<_, Option<String>>(4)?
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| bad_column(4, e.to_string()))
        })
        .transpose()?;
    let completed_at = row
        .get::<_, Option<String>>(8)?
        .map(|s| parse_timestamp(&s, 8))
        .transpose()?;

    Ok(Task {
        id: Some(row.get(0)?),
        description: row.get(1)?,
        priority,
        category: row.get(3)?,
        due_date,
        completed: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?, 6)?,
        updated_at: parse_timestamp(&row.get::<_, String>(7)?, 7)?,
        completed_at,
    })
}

fn parse_timestamp(raw: &str, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| bad_column(index, e.to_string()))
}

fn bad_column(index: usize, message: impl Into<String>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into().into())
}

/// Escape LIKE special characters for safe pattern matching.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
