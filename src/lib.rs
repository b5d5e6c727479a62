//! taskkeep - single-user task tracking over a local SQLite store
//!
//! This library implements the core of a desktop task tracker: a validated
//! domain model for tasks and categories, a SQLite-backed persistence layer
//! with versioned startup migrations, an import/export adapter for JSON and
//! CSV, and whole-file backup/restore.
//!
//! # Architecture
//!
//! The library follows a 3-layer architecture:
//! - **Domain Layer**: `model` module - task and category types with pure
//!   validation, no I/O
//! - **Persistence Layer**: `db` module - the [`Database`] handle, scoped
//!   transactions and schema migrations
//! - **Adapter Layer**: `export` and `backup` modules - file formats and
//!   store copies, built on the [`Repository`] trait
//!
//! The presentation layer (a GUI or the bundled CLI) sits on top and issues
//! one call at a time; every mutating call commits fully or rolls back.
//!
//! # Example
//!
//! ```no_run
//! use taskkeep::{Database, TaskDraft};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let db = Database::open("data/tasks.db")?;
//!     let id = db.create_task(&TaskDraft::new("Water the plants"))?;
//!     println!("created task {id}");
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod model;
pub mod repository;

// Re-export commonly used types
pub use config::Settings;
pub use db::{Database, SCHEMA_VERSION, TaskFilter, TaskStatistics};
pub use error::{Error, Result};
pub use export::{ExportDocument, ImportReport};
pub use model::{Category, DEFAULT_CATEGORY, Priority, Task, TaskDraft, TaskPatch};
pub use repository::Repository;
