//! Application state management

use crate::db::sqlite::SqliteDb;
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application state shared across all services
pub struct AppState {
    /// SQLite database connection
    pub db: Arc<SqliteDb>,

    /// Path of the database file
    pub db_path: PathBuf,
}

impl AppState {
    /// Create new application state backed by the database at `db_path`
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Config(format!(
                        "Failed to create data directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        tracing::info!("Database: {:?}", db_path);

        let db = Arc::new(SqliteDb::new(db_path)?);

        Ok(Self {
            db,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Create state over an in-memory database (tests only)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Arc::new(SqliteDb::open_in_memory()?),
            db_path: PathBuf::from(":memory:"),
        })
    }
}
