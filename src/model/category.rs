//! Category domain model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The reserved default category. Always present, cannot be deleted;
/// tasks from deleted categories are reassigned to it.
pub const DEFAULT_CATEGORY: &str = "General";

/// Maximum length of a category name.
pub const MAX_NAME_LEN: usize = 50;

/// A user-defined label grouping tasks. Names are unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validate a category name: non-empty, bounded length, and limited to
/// letters, digits, spaces, hyphens and underscores.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("category", "cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::validation(
            "category",
            format!("name cannot exceed {} characters", MAX_NAME_LEN),
        ));
    }
    let valid = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_');
    if !valid {
        return Err(Error::validation(
            "category",
            "name can only contain letters, numbers, spaces, hyphens, and underscores",
        ));
    }
    Ok(())
}
