//! Configuration management.
//!
//! Resolves where the store lives and how to talk to it. Every setting
//! follows the same priority: explicit CLI flag, then environment
//! variable, then default.
//!
//! - **Database**: `--db` / `ARCHISYNC_DB` / `~/.archisync/data/archisync.db`
//! - **Dialect**: `--dialect` / `ARCHISYNC_DIALECT` / `sqlite`
//! - **Schema prefix**: `--schema` / `ARCHISYNC_SCHEMA` / none

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::{Database, Dialect};

/// Get the global archisync directory location (`~/.archisync/`).
#[must_use]
pub fn global_archisync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".archisync"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `ARCHISYNC_DB` environment variable
/// 3. Global location: `~/.archisync/data/archisync.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no location found.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(db_path) = std::env::var("ARCHISYNC_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_archisync_dir().map(|dir| dir.join("data").join("archisync.db"))
}

/// Resolve the SQL dialect.
///
/// # Errors
///
/// Returns `Config` if the name is not a known dialect.
pub fn resolve_dialect(explicit: Option<&str>) -> Result<Dialect> {
    let name = explicit
        .map(str::to_string)
        .or_else(|| std::env::var("ARCHISYNC_DIALECT").ok())
        .filter(|name| !name.trim().is_empty());
    name.map_or(Ok(Dialect::default()), |name| name.trim().parse())
}

/// Resolve the schema prefix applied to every table name.
#[must_use]
pub fn resolve_schema(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("ARCHISYNC_SCHEMA").ok())
        .map(|schema| schema.trim().to_string())
        .unwrap_or_default()
}

/// Everything needed to open the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub dialect: Dialect,
    pub schema: String,
}

impl StoreConfig {
    /// # Errors
    ///
    /// Returns `Config` if no database location can be found or the
    /// dialect is unknown.
    pub fn resolve(db: Option<&Path>, dialect: Option<&str>, schema: Option<&str>) -> Result<Self> {
        let path = resolve_db_path(db)
            .ok_or_else(|| Error::Config("could not determine the database location".to_string()))?;
        Ok(Self {
            path,
            dialect: resolve_dialect(dialect)?,
            schema: resolve_schema(schema),
        })
    }

    /// Open the existing store.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if there is no store at the path.
    pub fn open(&self) -> Result<Database> {
        debug!(path = %self.path.display(), dialect = %self.dialect, schema = %self.schema, "opening store");
        Ok(Database::open(&self.path)?
            .with_dialect(self.dialect)
            .with_schema(&self.schema))
    }
}
