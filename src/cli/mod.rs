//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// archisync - versioned import of ArchiMate models from a relational store
#[derive(Parser, Debug)]
#[command(name = "archisync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.archisync/data/archisync.db)
    #[arg(long, global = true, env = "ARCHISYNC_DB")]
    pub db: Option<PathBuf>,

    /// SQL dialect of the store (sqlite, postgresql, mysql, ms-sql, oracle)
    #[arg(long, global = true, env = "ARCHISYNC_DIALECT")]
    pub dialect: Option<String>,

    /// Schema prefixed to every table name
    #[arg(long, global = true, env = "ARCHISYNC_SCHEMA")]
    pub schema: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store and its schema
    Init {
        /// Re-apply the schema to an existing store
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// List stored model versions
    Models {
        /// Case-insensitive name filter (% wildcards)
        #[arg(long)]
        name: Option<String>,
    },

    /// Import a stored model and report what was materialized
    Import(ImportArgs),

    /// Show one stored component row with its properties
    Show {
        /// Component kind (folder, element, relationship, view, view-object, view-connection)
        kind: String,

        /// Component identifier
        id: String,

        /// Version to read (0 = latest)
        #[arg(long, default_value_t = 0)]
        version: i64,
    },

    /// Stored images
    Images {
        #[command(subcommand)]
        command: ImageCommands,
    },

    /// Import a model and report which components would be exported
    Status(ModelArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which stored model to load.
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model identifier
    pub model_id: String,

    /// Model version to import (0 = latest)
    #[arg(long, default_value_t = 0)]
    pub version: i64,

    /// Import the latest version of every component instead of the
    /// versions pinned by the model snapshot
    #[arg(long)]
    pub latest: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Write the model's images into this directory
    #[arg(long)]
    pub images_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    /// List every stored image path
    List,

    /// Write one stored image to a file
    Get {
        /// Image path in the store
        path: String,

        /// Output file (default: file name of the image path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
