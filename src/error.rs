//! Error types for the taskkeep library
//!
//! Three families of failure: validation errors (bad field values, named
//! after the offending field), persistence errors (store, constraint and
//! migration failures) and import/export errors. Mutating store operations
//! either succeed fully or leave the store unchanged.

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field value failed domain validation. `field` names the offender.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("task {0} not found")]
    TaskNotFound(i64),

    #[error("category '{0}' not found")]
    CategoryNotFound(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    /// A store-level rule was violated (e.g. deleting the default category).
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("migration to schema version {version} failed: {message}")]
    Migration { version: i64, message: String },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Backup file unreadable or not a valid store.
    #[error("backup error: {0}")]
    Backup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}
