//! taskkeep CLI - Main Entry Point
//!
//! Thin presentation layer standing in for the graphical front end: each
//! subcommand maps onto exactly one library call and prints the result.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskkeep::model::task::parse_due_date;
use taskkeep::{
    Database, Priority, Settings, Task, TaskDraft, TaskFilter, TaskPatch, backup, export,
};

/// taskkeep - track tasks in a local SQLite store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file (defaults to the configured data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a new task
    Add {
        description: String,
        /// Priority: Low, Medium, High or Urgent
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Due date in YYYY-MM-DD format
        #[arg(short, long)]
        due: Option<String>,
    },
    /// List tasks, optionally filtered
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Only completed tasks
        #[arg(long, conflicts_with = "open")]
        completed: bool,
        /// Only open tasks
        #[arg(long)]
        open: bool,
        /// Case-insensitive substring match on the description
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one task in full
    Show { id: i64 },
    /// Update fields of a task
    Update {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// New due date in YYYY-MM-DD format
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Mark a task completed
    Done { id: i64 },
    /// Reopen a completed task
    Reopen { id: i64 },
    /// Delete a task
    Delete { id: i64 },
    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Export tasks to a JSON or CSV file
    Export {
        /// Output format: json or csv
        #[arg(long, default_value = "json")]
        format: String,
        /// Directory for the export file (defaults to the configured
        /// export directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Import tasks from a JSON or CSV file
    Import {
        path: PathBuf,
        /// Input format: json or csv (inferred from the extension if
        /// omitted)
        #[arg(long)]
        format: Option<String>,
    },
    /// Copy the store file to a timestamped backup
    Backup {
        /// Directory for the backup file (defaults to the configured
        /// backup directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Replace the store with a backup file
    Restore { path: PathBuf },
    /// Show task statistics
    Stats,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// Add a category
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List categories
    List,
    /// Delete a category, moving its tasks to General
    Delete { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    settings.ensure_directories()?;
    let db_path = cli.db.unwrap_or_else(|| settings.db_path());
    let db = Database::open(&db_path)?;

    run(db, &settings, cli.command)
}

fn run(db: Database, settings: &Settings, command: Command) -> Result<()> {
    match command {
        Command::Add {
            description,
            priority,
            category,
            due,
        } => {
            let mut draft = TaskDraft::new(description);
            if let Some(raw) = priority {
                draft.priority = parse_priority(&raw)?;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if let Some(raw) = due {
                draft.due_date = Some(parse_due_date(&raw)?);
            }
            let id = db.create_task(&draft)?;
            println!("Task created with ID {}", id);
        }
        Command::List {
            category,
            priority,
            completed,
            open,
            search,
        } => {
            let filter = TaskFilter {
                category,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                completed: match (completed, open) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                search,
            };
            let tasks = db.list_tasks(&filter)?;
            if tasks.is_empty() {
                println!("No tasks found");
            }
            for task in &tasks {
                println!("{:>4}  {}  ({})", task.id.unwrap_or_default(), task, task.category);
            }
        }
        Command::Show { id } => print_task(&db.get_task(id)?),
        Command::Update {
            id,
            description,
            priority,
            category,
            due,
            clear_due,
        } => {
            let patch = TaskPatch {
                description,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                category,
                due_date: match (due, clear_due) {
                    (Some(raw), _) => Some(Some(parse_due_date(&raw)?)),
                    (None, true) => Some(None),
                    (None, false) => None,
                },
                completed: None,
            };
            if patch.is_empty() {
                bail!("nothing to update");
            }
            db.update_task(id, &patch)?;
            println!("Task {} updated", id);
        }
        Command::Done { id } => {
            db.update_task(id, &completed_patch(true))?;
            println!("Task {} completed", id);
        }
        Command::Reopen { id } => {
            db.update_task(id, &completed_patch(false))?;
            println!("Task {} reopened", id);
        }
        Command::Delete { id } => {
            db.delete_task(id)?;
            println!("Task {} deleted", id);
        }
        Command::Categories(command) => match command {
            CategoryCommand::Add { name, description } => {
                db.create_category(&name, description.as_deref())?;
                println!("Category '{}' created", name);
            }
            CategoryCommand::List => {
                for category in db.list_categories()? {
                    match category.description {
                        Some(ref text) => println!("{}  - {}", category.name, text),
                        None => println!("{}", category.name),
                    }
                }
            }
            CategoryCommand::Delete { name } => {
                db.delete_category(&name)?;
                println!("Category '{}' deleted; its tasks moved to General", name);
            }
        },
        Command::Export { format, dir } => {
            let dir = dir.unwrap_or_else(|| settings.export_dir());
            let path = match format.as_str() {
                "json" => export::export_json_file(&db, &TaskFilter::default(), &dir)?,
                "csv" => export::export_csv_file(&db, &TaskFilter::default(), &dir)?,
                other => bail!("unknown export format '{}', expected json or csv", other),
            };
            println!("Exported to {}", path.display());
        }
        Command::Import { path, format } => {
            let format = match format {
                Some(format) => format,
                None => path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_ascii_lowercase(),
            };
            let report = match format.as_str() {
                "json" => export::import_json_file(&db, &path)?,
                "csv" => export::import_csv_file(&db, &path)?,
                other => bail!("unknown import format '{}', expected json or csv", other),
            };
            println!("Imported {} task(s)", report.imported);
            for skipped in &report.skipped {
                println!("  skipped record {}: {}", skipped.index, skipped.reason);
            }
        }
        Command::Backup { dir } => {
            let dir = dir.unwrap_or_else(|| settings.backup_dir());
            let path = backup::create_backup(&db, &dir)?;
            println!("Backup created at {}", path.display());
        }
        Command::Restore { path } => {
            backup::restore_backup(db, &path)?;
            println!("Store restored from {}", path.display());
        }
        Command::Stats => {
            let stats = db.task_statistics()?;
            println!("Total: {}", stats.total);
            println!("Active: {}", stats.active);
            println!("Completed: {}", stats.completed);
            println!("Overdue: {}", stats.overdue);
            if !stats.by_priority.is_empty() {
                println!("Open tasks by priority:");
                for (priority, count) in &stats.by_priority {
                    println!("  {}: {}", priority, count);
                }
            }
            if !stats.by_category.is_empty() {
                println!("Open tasks by category:");
                for (category, count) in &stats.by_category {
                    println!("  {}: {}", category, count);
                }
            }
        }
    }
    Ok(())
}

fn parse_priority(raw: &str) -> Result<Priority> {
    raw.parse::<Priority>().map_err(anyhow::Error::msg)
}

fn completed_patch(completed: bool) -> TaskPatch {
    TaskPatch {
        completed: Some(completed),
        ..TaskPatch::default()
    }
}

fn print_task(task: &Task) {
    println!("{}", task);
    if let Some(id) = task.id {
        println!("  ID: {}", id);
    }
    println!("  Category: {}", task.category);
    println!("  Created: {}", task.created_at.to_rfc3339());
    println!("  Updated: {}", task.updated_at.to_rfc3339());
    if let Some(completed_at) = task.completed_at {
        println!("  Completed: {}", completed_at.to_rfc3339());
    }
}
