//! Domain model: tasks and categories
//!
//! Pure validation and conversion types with no I/O. The persistence layer
//! turns these into rows and back; the import/export adapter serializes
//! them through serde.

pub mod category;
pub mod task;

pub use category::{Category, DEFAULT_CATEGORY};
pub use task::{Priority, Task, TaskDraft, TaskPatch};
