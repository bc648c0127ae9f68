//! Import a stored model.

use crate::cli::{ImportArgs, ModelArgs};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::model::Model;
use crate::sync::{Category, ImportConnection, ImportStats, MemoryArchive};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct ImportOutput<'a> {
    model_id: &'a str,
    name: &'a str,
    version: i64,
    latest_database_version: i64,
    stats: &'a ImportStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    images_written: Option<usize>,
}

/// Import the model named by `args` through `connection`.
pub(crate) fn load_model(
    connection: &mut ImportConnection,
    args: &ModelArgs,
) -> Result<(Model, MemoryArchive, ImportStats)> {
    let mut model = Model::new(args.model_id.clone()).with_version(args.version);
    model.set_import_latest_version(args.latest);
    let mut archive = MemoryArchive::new();
    let stats = connection.import_full_model(&mut model, &mut archive)?;
    Ok((model, archive, stats))
}

/// Execute the import command.
///
/// # Errors
///
/// Returns `ModelNotFound` if the model is not stored, or any error of
/// the import itself.
pub fn execute(config: &StoreConfig, args: &ImportArgs, json: bool) -> Result<()> {
    let mut connection = ImportConnection::new(config.open()?);
    let (model, archive, stats) = load_model(&mut connection, &args.model)?;

    let images_written = match &args.images_dir {
        Some(dir) => Some(write_images(&archive, dir)?),
        None => None,
    };

    if json {
        let output = ImportOutput {
            model_id: &model.id,
            name: &model.name,
            version: model.initial_version.version,
            latest_database_version: model.latest_database_version.version,
            stats: &stats,
            images_written,
        };
        println!("{}", serde_json::to_string(&output)?);
        return connection.close();
    }

    println!(
        "{} {} (version {})",
        "Imported".green().bold(),
        model.name.bold(),
        model.initial_version.version
    );
    for category in Category::ALL {
        let count = stats.get(category);
        if count.expected == 0 && count.imported == 0 {
            continue;
        }
        println!("  {:<18} {}", format!("{category}:"), count.imported);
    }
    if let (Some(written), Some(dir)) = (images_written, &args.images_dir) {
        println!("  {written} images written to {}", dir.display());
    }
    if model.initial_version.version < model.latest_database_version.version {
        println!(
            "{}",
            format!(
                "Version {} of this model is the newest in the store.",
                model.latest_database_version.version
            )
            .dimmed()
        );
    }
    connection.close()
}

/// Write every archived image under `dir`, keeping its relative path.
fn write_images(archive: &MemoryArchive, dir: &Path) -> Result<usize> {
    let mut written = 0;
    for path in archive.paths() {
        let Some(bytes) = archive.get(path) else {
            continue;
        };
        let target = dir.join(path.trim_start_matches('/'));
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;
        debug!(path, target = %target.display(), "wrote image");
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ArchiveManager;

    #[test]
    fn test_write_images_keeps_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = MemoryArchive::new();
        archive.add_byte_content_entry("images/a.png", vec![1, 2, 3]).unwrap();
        archive.add_byte_content_entry("b.png", vec![4]).unwrap();

        let written = write_images(&archive, dir.path()).unwrap();
        assert_eq!(written, 2);
        assert_eq!(std::fs::read(dir.path().join("images/a.png")).unwrap(), vec![1, 2, 3]);
        assert!(dir.path().join("b.png").exists());
    }
}
