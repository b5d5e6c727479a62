//! Task domain model
//!
//! Pure validation and conversion, no I/O. A [`TaskDraft`] is the validated
//! input for creating a task, a [`TaskPatch`] is a typed partial update, and
//! [`Task`] is the full record as stored.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::category;

/// Maximum length of a task description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Date format for due dates (YYYY-MM-DD).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Task priority, lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All priorities in ascending order.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!(
                "unknown priority '{}'. Valid priorities: Low, Medium, High, Urgent",
                other
            )),
        }
    }
}

/// A tracked task as stored.
///
/// `id` is `None` until the store assigns one. Timestamps are set by the
/// persistence layer, never by callers. Field order matches the column
/// order of the `tasks` table, which fixes the CSV export layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// True when the task is still open and its due date has passed.
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) if !self.completed => due < Local::now().date_naive(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.completed { "\u{2713}" } else { "\u{25cb}" };
        write!(f, "{} [{}] {}", status, self.priority, self.description)?;
        if let Some(due) = self.due_date {
            write!(f, " (Due: {})", due.format(DATE_FORMAT))?;
        }
        Ok(())
    }
}

/// Validated input for creating a new task.
///
/// Priority and due date are already typed, so only the free-text fields
/// need checking. Validation errors name the offending field.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Create a draft with default priority and category.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            priority: Priority::default(),
            category: category::DEFAULT_CATEGORY.to_string(),
            due_date: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_description(&self.description)?;
        category::validate_name(&self.category)?;
        Ok(())
    }
}

/// Typed partial update for a task. `None` leaves a field untouched.
///
/// `due_date` uses a double option so the date can be explicitly cleared:
/// `Some(None)` removes it, `Some(Some(date))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }

    /// Validate only the fields the patch actually changes.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        if let Some(ref name) = self.category {
            category::validate_name(name)?;
        }
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::validation("description", "cannot be empty"));
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(Error::validation(
            "description",
            format!("cannot exceed {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(())
}

/// Parse a due date in YYYY-MM-DD format.
pub fn parse_due_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        Error::validation(
            "due_date",
            format!("'{}' is not a date in YYYY-MM-DD format", s),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task() -> Task {
        Task {
            id: Some(1),
            description: "Write report".to_string(),
            priority: Priority::High,
            category: "Work".to_string(),
            due_date: None,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_priority_parse_roundtrip() {
        for priority in Priority::ALL {
            let parsed: Priority = priority.as_str().parse().unwrap();
            assert_eq!(parsed, priority);
        }
    }

    #[test]
    fn test_priority_parse_case_insensitive() {
        assert_eq!("urgent".parse::<Priority>().unwrap(), Priority::Urgent);
        assert_eq!(" LOW ".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn test_priority_parse_unknown() {
        let err = "critical".parse::<Priority>().unwrap_err();
        assert!(err.contains("Valid priorities"));
    }

    #[test]
    fn test_draft_defaults() {
        let draft = TaskDraft::new("Buy milk");
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.category, "General");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_empty_description_rejected() {
        let draft = TaskDraft::new("   ");
        let err = draft.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation { field: "description", .. }
        ));
    }

    #[test]
    fn test_draft_long_description_rejected() {
        let draft = TaskDraft::new("x".repeat(MAX_DESCRIPTION_LEN + 1));
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_patch_empty() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_validates_changed_fields_only() {
        let patch = TaskPatch {
            priority: Some(Priority::Urgent),
            ..TaskPatch::default()
        };
        assert!(patch.validate().is_ok());

        let bad = TaskPatch {
            description: Some(String::new()),
            ..TaskPatch::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2026-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
        assert!(parse_due_date("15/03/2026").is_err());
        assert!(parse_due_date("not-a-date").is_err());
    }

    #[test]
    fn test_is_overdue() {
        let today = Local::now().date_naive();
        let mut task = sample_task();
        assert!(!task.is_overdue());

        task.due_date = Some(today - Duration::days(1));
        assert!(task.is_overdue());

        task.due_date = Some(today + Duration::days(1));
        assert!(!task.is_overdue());

        task.due_date = Some(today - Duration::days(1));
        task.completed = true;
        assert!(!task.is_overdue());
    }

    #[test]
    fn test_task_json_roundtrip() {
        let task = sample_task();
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_task_display() {
        let mut task = sample_task();
        task.due_date = Some(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        let line = task.to_string();
        assert!(line.contains("[High]"));
        assert!(line.contains("Write report"));
        assert!(line.contains("(Due: 2026-01-02)"));
    }
}
