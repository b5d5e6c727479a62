//! Task CRUD integration tests

mod common;

use chrono::{Duration, Local};
use common::{completed_patch, date, full_draft, open_test_db};
use taskkeep::{Error, Priority, TaskDraft, TaskFilter, TaskPatch};

#[test]
fn test_create_then_get_returns_equal_record() {
    let db = open_test_db();
    db.create_category("Work", None).unwrap();

    let draft = full_draft(
        "Prepare quarterly review",
        Priority::High,
        "Work",
        Some(date(2026, 9, 30)),
    );
    let id = db.create_task(&draft).unwrap();
    let task = db.get_task(id).unwrap();

    assert_eq!(task.id, Some(id));
    assert_eq!(task.description, draft.description);
    assert_eq!(task.priority, draft.priority);
    assert_eq!(task.category, draft.category);
    assert_eq!(task.due_date, draft.due_date);
    assert!(!task.completed);
    assert!(task.completed_at.is_none());
    assert_eq!(task.created_at, task.updated_at);
}

#[test]
fn test_create_defaults() {
    let db = open_test_db();
    let id = db.create_task(&TaskDraft::new("Water the plants")).unwrap();
    let task = db.get_task(id).unwrap();
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.category, "General");
    assert!(task.due_date.is_none());
}

#[test]
fn test_create_rejects_empty_description() {
    let db = open_test_db();
    let err = db.create_task(&TaskDraft::new("  ")).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation { field: "description", .. }
    ));
}

#[test]
fn test_create_rejects_unknown_category() {
    let db = open_test_db();
    let draft = full_draft("Orphaned", Priority::Low, "Nonexistent", None);
    let err = db.create_task(&draft).unwrap_err();
    assert!(matches!(err, Error::CategoryNotFound(ref name) if name == "Nonexistent"));

    // The failed insert must leave no trace.
    assert!(db.list_tasks(&TaskFilter::default()).unwrap().is_empty());
}

#[test]
fn test_get_missing_task() {
    let db = open_test_db();
    let err = db.get_task(999).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(999)));
}

#[test]
fn test_list_filter_by_priority() {
    let db = open_test_db();
    db.create_task(&full_draft("a", Priority::High, "General", None))
        .unwrap();
    db.create_task(&full_draft("b", Priority::High, "General", None))
        .unwrap();
    db.create_task(&full_draft("c", Priority::Low, "General", None))
        .unwrap();

    let high = db
        .list_tasks(&TaskFilter {
            priority: Some(Priority::High),
            ..TaskFilter::default()
        })
        .unwrap();
    assert_eq!(high.len(), 2);
    assert!(high.iter().all(|t| t.priority == Priority::High));

    let urgent = db
        .list_tasks(&TaskFilter {
            priority: Some(Priority::Urgent),
            ..TaskFilter::default()
        })
        .unwrap();
    assert!(urgent.is_empty());
}

#[test]
fn test_list_filter_by_category_and_completed() {
    let db = open_test_db();
    db.create_category("Errands", None).unwrap();
    let done_id = db
        .create_task(&full_draft("post letter", Priority::Low, "Errands", None))
        .unwrap();
    db.create_task(&full_draft("buy stamps", Priority::Low, "Errands", None))
        .unwrap();
    db.create_task(&TaskDraft::new("unrelated")).unwrap();
    db.update_task(done_id, &completed_patch(true)).unwrap();

    let open_errands = db
        .list_tasks(&TaskFilter {
            category: Some("Errands".to_string()),
            completed: Some(false),
            ..TaskFilter::default()
        })
        .unwrap();
    assert_eq!(open_errands.len(), 1);
    assert_eq!(open_errands[0].description, "buy stamps");
}

#[test]
fn test_list_search_is_case_insensitive() {
    let db = open_test_db();
    db.create_task(&TaskDraft::new("Buy MILK and eggs")).unwrap();
    db.create_task(&TaskDraft::new("Call the bank")).unwrap();

    let found = db
        .list_tasks(&TaskFilter {
            search: Some("milk".to_string()),
            ..TaskFilter::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].description, "Buy MILK and eggs");
}

#[test]
fn test_list_search_escapes_like_wildcards() {
    let db = open_test_db();
    db.create_task(&TaskDraft::new("refund 50% of order")).unwrap();
    db.create_task(&TaskDraft::new("refund 50x of order")).unwrap();

    let found = db
        .list_tasks(&TaskFilter {
            search: Some("50%".to_string()),
            ..TaskFilter::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].description, "refund 50% of order");
}

#[test]
fn test_list_orders_newest_first() {
    let db = open_test_db();
    let first = db.create_task(&TaskDraft::new("first")).unwrap();
    let second = db.create_task(&TaskDraft::new("second")).unwrap();

    let tasks = db.list_tasks(&TaskFilter::default()).unwrap();
    assert_eq!(tasks[0].id, Some(second));
    assert_eq!(tasks[1].id, Some(first));
}

#[test]
fn test_update_rewrites_fields_and_bumps_updated_at() {
    let db = open_test_db();
    db.create_category("Work", None).unwrap();
    let id = db.create_task(&TaskDraft::new("draft agenda")).unwrap();
    let before = db.get_task(id).unwrap();

    let patch = TaskPatch {
        description: Some("draft meeting agenda".to_string()),
        priority: Some(Priority::Urgent),
        category: Some("Work".to_string()),
        due_date: Some(Some(date(2026, 8, 20))),
        completed: None,
    };
    db.update_task(id, &patch).unwrap();

    let task = db.get_task(id).unwrap();
    assert_eq!(task.description, "draft meeting agenda");
    assert_eq!(task.priority, Priority::Urgent);
    assert_eq!(task.category, "Work");
    assert_eq!(task.due_date, Some(date(2026, 8, 20)));
    assert_eq!(task.created_at, before.created_at);
    assert!(task.updated_at >= before.updated_at);
}

#[test]
fn test_update_clears_due_date() {
    let db = open_test_db();
    let id = db
        .create_task(&full_draft("dated", Priority::Low, "General", Some(date(2026, 1, 1))))
        .unwrap();

    db.update_task(
        id,
        &TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        },
    )
    .unwrap();
    assert!(db.get_task(id).unwrap().due_date.is_none());
}

#[test]
fn test_complete_sets_completed_at_and_reopen_clears_it() {
    let db = open_test_db();
    let id = db.create_task(&TaskDraft::new("ship release")).unwrap();

    db.update_task(id, &completed_patch(true)).unwrap();
    let done = db.get_task(id).unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    db.update_task(id, &completed_patch(false)).unwrap();
    let reopened = db.get_task(id).unwrap();
    assert!(!reopened.completed);
    assert!(reopened.completed_at.is_none());
}

#[test]
fn test_completing_twice_keeps_original_timestamp() {
    let db = open_test_db();
    let id = db.create_task(&TaskDraft::new("idempotent done")).unwrap();

    db.update_task(id, &completed_patch(true)).unwrap();
    let first = db.get_task(id).unwrap().completed_at;
    db.update_task(id, &completed_patch(true)).unwrap();
    let second = db.get_task(id).unwrap().completed_at;
    assert_eq!(first, second);
}

#[test]
fn test_update_rejects_unknown_category_and_rolls_back() {
    let db = open_test_db();
    let id = db.create_task(&TaskDraft::new("stable")).unwrap();

    let err = db
        .update_task(
            id,
            &TaskPatch {
                description: Some("changed".to_string()),
                category: Some("Ghost".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::CategoryNotFound(_)));

    // Nothing from the failed patch may stick.
    assert_eq!(db.get_task(id).unwrap().description, "stable");
}

#[test]
fn test_update_missing_task() {
    let db = open_test_db();
    let err = db.update_task(42, &completed_patch(true)).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(42)));
}

#[test]
fn test_delete_task() {
    let db = open_test_db();
    let id = db.create_task(&TaskDraft::new("short-lived")).unwrap();
    db.delete_task(id).unwrap();
    assert!(matches!(db.get_task(id), Err(Error::TaskNotFound(_))));

    let err = db.delete_task(id).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(_)));
}

#[test]
fn test_statistics() {
    let db = open_test_db();
    db.create_category("Work", None).unwrap();
    let yesterday = Local::now().date_naive() - Duration::days(1);

    db.create_task(&full_draft("overdue", Priority::High, "Work", Some(yesterday)))
        .unwrap();
    db.create_task(&full_draft("open", Priority::Medium, "General", None))
        .unwrap();
    let done_id = db
        .create_task(&full_draft("done", Priority::Low, "General", None))
        .unwrap();
    db.update_task(done_id, &completed_patch(true)).unwrap();

    let stats = db.task_statistics().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.active, 2);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.by_priority.get(&Priority::High), Some(&1));
    assert_eq!(stats.by_priority.get(&Priority::Medium), Some(&1));
    assert_eq!(stats.by_priority.get(&Priority::Low), None);
    assert_eq!(stats.by_category.get("Work"), Some(&1));
    assert_eq!(stats.by_category.get("General"), Some(&1));
}
