//! Stored image commands.

use crate::cli::ImageCommands;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::sync::ImportConnection;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ImageOutput {
    path: String,
    output: PathBuf,
    bytes: usize,
}

/// Execute an images subcommand.
///
/// # Errors
///
/// Returns `ImageNotFound` if the requested image is not stored, or an
/// I/O error if it cannot be written.
pub fn execute(config: &StoreConfig, command: &ImageCommands, json: bool) -> Result<()> {
    let connection = ImportConnection::new(config.open()?);
    match command {
        ImageCommands::List => {
            let paths = connection.get_image_list()?;
            if json {
                println!("{}", serde_json::to_string(&paths)?);
            } else {
                for path in &paths {
                    println!("{path}");
                }
            }
        }
        ImageCommands::Get { path, output } => {
            let bytes = connection
                .get_image(path)?
                .ok_or_else(|| Error::ImageNotFound { path: path.clone() })?;
            let output = output.clone().unwrap_or_else(|| default_output(path));
            std::fs::write(&output, &bytes)?;
            if json {
                let result = ImageOutput {
                    path: path.clone(),
                    output,
                    bytes: bytes.len(),
                };
                println!("{}", serde_json::to_string(&result)?);
            } else {
                println!("Wrote {} bytes to {}", bytes.len(), output.display());
            }
        }
    }
    connection.close()
}

fn default_output(path: &str) -> PathBuf {
    Path::new(path)
        .file_name()
        .map_or_else(|| PathBuf::from("image.bin"), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_uses_file_name() {
        assert_eq!(default_output("images/logo.png"), PathBuf::from("logo.png"));
        assert_eq!(default_output(""), PathBuf::from("image.bin"));
    }
}
