//! Create the store.
//!
//! `archisync init` creates the SQLite database at the resolved path and
//! applies the schema. An existing store is left alone unless `--force`
//! is given, in which case the schema is re-applied (tables are created
//! if missing, existing data is kept).

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::storage::Database;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    schema_version: i64,
    created: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the store exists and `force` is not
/// set, or an error if the database cannot be created.
pub fn execute(config: &StoreConfig, force: bool, json: bool) -> Result<()> {
    let existed = config.path.exists();
    if existed && !force {
        return Err(Error::AlreadyInitialized {
            path: config.path.clone(),
        });
    }

    Database::create(&config.path)?.close()?;

    if json {
        let output = InitOutput {
            database: config.path.clone(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created: !existed,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else if existed {
        println!("Re-applied schema {CURRENT_SCHEMA_VERSION}");
        println!("  Database: {}", config.path.display());
    } else {
        println!("Initialized archisync store");
        println!("  Database: {}", config.path.display());
    }
    Ok(())
}
