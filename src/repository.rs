//! Storage-agnostic repository interface
//!
//! The import/export adapter and other collaborators depend on this trait
//! rather than on SQLite specifics, so the persistence layer can be backed
//! by any embedded store.

use crate::db::{Database, TaskFilter};
use crate::error::Result;
use crate::model::{Category, Task, TaskDraft, TaskPatch};

/// Minimal create/read/update/delete/list interface over tasks and
/// categories.
pub trait Repository {
    fn create_task(&self, draft: &TaskDraft) -> Result<i64>;
    fn get_task(&self, id: i64) -> Result<Task>;
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
    fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<()>;
    fn delete_task(&self, id: i64) -> Result<()>;

    fn create_category(&self, name: &str, description: Option<&str>) -> Result<i64>;
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn delete_category(&self, name: &str) -> Result<()>;
}

impl Repository for Database {
    fn create_task(&self, draft: &TaskDraft) -> Result<i64> {
        Database::create_task(self, draft)
    }

    fn get_task(&self, id: i64) -> Result<Task> {
        Database::get_task(self, id)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Database::list_tasks(self, filter)
    }

    fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<()> {
        Database::update_task(self, id, patch)
    }

    fn delete_task(&self, id: i64) -> Result<()> {
        Database::delete_task(self, id)
    }

    fn create_category(&self, name: &str, description: Option<&str>) -> Result<i64> {
        Database::create_category(self, name, description)
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        Database::list_categories(self)
    }

    fn delete_category(&self, name: &str) -> Result<()> {
        Database::delete_category(self, name)
    }
}
