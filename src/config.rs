//! Environment-variable settings
//!
//! Consumed once at startup; there is no runtime reload. Every knob has a
//! default so a bare environment just works.

use std::env;
use std::path::PathBuf;

use crate::error::Result;

/// Application settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory for the store, exports and backups
    /// (`TASKKEEP_DATA_DIR`, default `./data`).
    pub data_dir: PathBuf,
    /// Store file name inside the data directory (`TASKKEEP_DB`).
    pub db_file: String,
    /// Tracing filter directive (`TASKKEEP_LOG`, default `info`).
    pub log_filter: String,
    /// Window geometry (`WINDOW_WIDTH`/`WINDOW_HEIGHT`), consumed by the
    /// presentation layer.
    pub window_width: u32,
    pub window_height: u32,
    /// Presentation theme name (`THEME`).
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            db_file: "tasks.db".to_string(),
            log_filter: "info".to_string(),
            window_width: 1000,
            window_height: 700,
            theme: "default".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            data_dir: env::var("TASKKEEP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            db_file: env::var("TASKKEEP_DB").unwrap_or(defaults.db_file),
            log_filter: env::var("TASKKEEP_LOG").unwrap_or(defaults.log_filter),
            window_width: parse_var("WINDOW_WIDTH", defaults.window_width),
            window_height: parse_var("WINDOW_HEIGHT", defaults.window_height),
            theme: env::var("THEME").unwrap_or(defaults.theme),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    /// Create the data, export and backup directories if absent.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.export_dir())?;
        std::fs::create_dir_all(self.backup_dir())?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
