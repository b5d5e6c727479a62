//! Common test utilities for integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use taskkeep::{Database, Priority, TaskDraft, TaskPatch};

/// Open a fresh in-memory store with the schema fully migrated.
pub fn open_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Draft with every field set.
pub fn full_draft(
    description: &str,
    priority: Priority,
    category: &str,
    due_date: Option<NaiveDate>,
) -> TaskDraft {
    TaskDraft {
        description: description.to_string(),
        priority,
        category: category.to_string(),
        due_date,
    }
}

/// Patch that only flips the completed flag.
pub fn completed_patch(completed: bool) -> TaskPatch {
    TaskPatch {
        completed: Some(completed),
        ..TaskPatch::default()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
