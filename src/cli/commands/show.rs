//! Show one stored component.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::model::Kind;
use crate::sync::ImportConnection;
use colored::Colorize;

/// Execute the show command.
///
/// # Errors
///
/// Returns `UnknownKind` for an unknown kind name, or `ComponentNotFound`
/// if no such row is stored.
pub fn execute(config: &StoreConfig, kind: &str, id: &str, version: i64, json: bool) -> Result<()> {
    let kind = Kind::parse(kind)?;
    let connection = ImportConnection::new(config.open()?);
    let object = connection
        .get_object(id, kind, version)?
        .ok_or_else(|| Error::ComponentNotFound {
            kind,
            id: id.to_string(),
            version: (version != 0).then_some(version),
        })?;

    if json {
        let payload = serde_json::to_string(&object)?;
        println!("{payload}");
        return connection.close();
    }

    println!("{} {}", kind.to_string().bold(), id.cyan());
    if let serde_json::Value::Object(columns) = &object.row {
        for (column, value) in columns {
            if column == "id" || value.is_null() {
                continue;
            }
            let text = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_string);
            println!("  {column:<24} {text}");
        }
    }
    if !object.properties.is_empty() {
        println!();
        println!("{}", "Properties:".blue().bold());
        for property in &object.properties {
            println!("  {} = {}", property.key, property.value.as_deref().unwrap_or(""));
        }
    }
    if !object.bendpoints.is_empty() {
        println!();
        println!("{}", "Bendpoints:".blue().bold());
        for point in &object.bendpoints {
            println!(
                "  ({}, {}) -> ({}, {})",
                point.start_x, point.start_y, point.end_x, point.end_y
            );
        }
    }
    connection.close()
}
