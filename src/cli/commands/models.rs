//! List stored model versions.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::sync::ImportConnection;
use colored::Colorize;

/// Execute the models command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried.
pub fn execute(config: &StoreConfig, name: Option<&str>, json: bool) -> Result<()> {
    let connection = ImportConnection::new(config.open()?);
    let models = connection.list_models(name)?;

    if json {
        let payload = serde_json::to_string(&models)?;
        println!("{payload}");
        return connection.close();
    }

    if models.is_empty() {
        println!("{}", "No models in the store.".dimmed());
        return connection.close();
    }

    println!("{}", format!("{:<40} {:>7}  {:<20}  {}", "ID", "VERSION", "CREATED", "NAME").bold());
    for model in &models {
        let created = model
            .created_on
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        println!("{:<40} {:>7}  {:<20}  {}", model.id, model.version, created, model.name);
    }
    connection.close()
}
