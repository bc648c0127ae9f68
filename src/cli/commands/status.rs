//! Sync status of a stored model.

use crate::cli::ModelArgs;
use crate::cli::commands::import::load_model;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::sync::{ImportConnection, print_status, sync_status};

/// Execute the status command.
///
/// Imports the model, recomputes every checksum and compares it with the
/// checksum stored for the imported version.
///
/// # Errors
///
/// Returns an error if the import or a checksum computation fails.
pub fn execute(config: &StoreConfig, args: &ModelArgs, json: bool) -> Result<()> {
    let mut connection = ImportConnection::new(config.open()?);
    let (mut model, _, _) = load_model(&mut connection, args)?;
    let status = sync_status(&mut model)?;

    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        print_status(&status);
    }
    connection.close()
}
