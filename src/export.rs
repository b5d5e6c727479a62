//! Import/export adapter
//!
//! Serializes the task set to JSON (task array plus metadata header) or CSV
//! (fixed column order matching the schema) and reads both formats back.
//! Import validates every record through the domain model; invalid records
//! are skipped and reported, never fatal to the batch. A file that fails to
//! parse at all is a fatal error.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::TaskFilter;
use crate::error::{Error, Result};
use crate::model::task::parse_due_date;
use crate::model::{DEFAULT_CATEGORY, Priority, Task, TaskDraft, TaskPatch};
use crate::repository::Repository;

/// Shape of a JSON export: metadata header plus the task array.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub task_count: usize,
    pub tasks: Vec<Task>,
}

/// Outcome of an import: how many records landed and which were skipped.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// A record the import rejected, with its position in the file.
#[derive(Debug)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Write the tasks matching `filter` as a JSON document. Returns the
/// number of tasks written.
pub fn export_json<W: Write>(
    repo: &impl Repository,
    filter: &TaskFilter,
    writer: W,
) -> Result<usize> {
    let tasks = repo.list_tasks(filter)?;
    let count = tasks.len();
    let document = ExportDocument {
        exported_at: Utc::now(),
        task_count: count,
        tasks,
    };
    serde_json::to_writer_pretty(writer, &document)?;
    info!(count, "tasks exported to JSON");
    Ok(count)
}

/// Export to a timestamped `tasks_export_<YYYYMMDD_HHMMSS>.json` under
/// `dir`, creating the directory if needed.
pub fn export_json_file(
    repo: &impl Repository,
    filter: &TaskFilter,
    dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name("json"));
    export_json(repo, filter, File::create(&path)?)?;
    Ok(path)
}

/// Write the tasks matching `filter` as CSV with a header row. Column
/// order follows the task schema.
pub fn export_csv<W: Write>(
    repo: &impl Repository,
    filter: &TaskFilter,
    writer: W,
) -> Result<usize> {
    let tasks = repo.list_tasks(filter)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for task in &tasks {
        csv_writer.serialize(task)?;
    }
    csv_writer.flush()?;
    info!(count = tasks.len(), "tasks exported to CSV");
    Ok(tasks.len())
}

/// Export to a timestamped `tasks_export_<YYYYMMDD_HHMMSS>.csv` under
/// `dir`, creating the directory if needed.
pub fn export_csv_file(
    repo: &impl Repository,
    filter: &TaskFilter,
    dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name("csv"));
    export_csv(repo, filter, File::create(&path)?)?;
    Ok(path)
}

/// Import tasks from a JSON export. Ids and timestamps in the file are
/// ignored; the store assigns fresh ones.
pub fn import_json<R: Read>(repo: &impl Repository, reader: R) -> Result<ImportReport> {
    let document: serde_json::Value = serde_json::from_reader(reader)?;
    let records = match document.get("tasks") {
        Some(serde_json::Value::Array(records)) => records.clone(),
        _ => Vec::new(),
    };

    let mut known_categories = category_names(repo)?;
    let mut report = ImportReport::default();
    for (index, value) in records.into_iter().enumerate() {
        let outcome = serde_json::from_value::<TaskRecord>(value)
            .map_err(Error::from)
            .and_then(|record| insert_record(repo, &mut known_categories, &record));
        record_outcome(&mut report, index, outcome);
    }
    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "JSON import finished"
    );
    Ok(report)
}

pub fn import_json_file(repo: &impl Repository, path: &Path) -> Result<ImportReport> {
    import_json(repo, File::open(path)?)
}

/// Import tasks from a CSV export. Rows that fail to parse or validate are
/// skipped and reported.
pub fn import_csv<R: Read>(repo: &impl Repository, reader: R) -> Result<ImportReport> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut known_categories = category_names(repo)?;
    let mut report = ImportReport::default();
    for (index, row) in csv_reader.deserialize::<TaskRecord>().enumerate() {
        let outcome = row
            .map_err(Error::from)
            .and_then(|record| insert_record(repo, &mut known_categories, &record));
        record_outcome(&mut report, index, outcome);
    }
    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "CSV import finished"
    );
    Ok(report)
}

pub fn import_csv_file(repo: &impl Repository, path: &Path) -> Result<ImportReport> {
    import_csv(repo, File::open(path)?)
}

/// One row/object of an import file. Unknown fields (id, timestamps) are
/// ignored; everything except the description is optional.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

fn insert_record(
    repo: &impl Repository,
    known_categories: &mut HashSet<String>,
    record: &TaskRecord,
) -> Result<()> {
    let priority = match non_empty(record.priority.as_deref()) {
        Some(raw) => raw
            .parse::<Priority>()
            .map_err(|e| Error::Validation {
                field: "priority",
                message: e,
            })?,
        None => Priority::default(),
    };
    let due_date = non_empty(record.due_date.as_deref())
        .map(parse_due_date)
        .transpose()?;
    let category = non_empty(record.category.as_deref())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    let draft = TaskDraft {
        description: record.description.clone(),
        priority,
        category: category.clone(),
        due_date,
    };
    draft.validate()?;

    // A record may name a category the store has not seen yet.
    if !known_categories.contains(&category) {
        repo.create_category(&category, None)?;
        known_categories.insert(category);
    }

    let id = repo.create_task(&draft)?;
    if record.completed.unwrap_or(false) {
        repo.update_task(
            id,
            &TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )?;
    }
    Ok(())
}

fn record_outcome(report: &mut ImportReport, index: usize, outcome: Result<()>) {
    match outcome {
        Ok(()) => report.imported += 1,
        Err(e) => {
            warn!(index, reason = %e, "import record skipped");
            report.skipped.push(SkippedRecord {
                index,
                reason: e.to_string(),
            });
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn category_names(repo: &impl Repository) -> Result<HashSet<String>> {
    Ok(repo
        .list_categories()?
        .into_iter()
        .map(|c| c.name)
        .collect())
}

fn export_file_name(extension: &str) -> String {
    format!(
        "tasks_export_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}
