//! Error types for archisync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, 5=integrity, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::Kind;

/// Result type alias for archisync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    ModelNotFound,
    ComponentNotFound,
    ImageNotFound,

    // Validation (exit 4)
    UnknownKind,
    WrongKind,
    InvalidArgument,

    // Integrity (exit 5)
    DanglingReference,
    UnknownFolder,
    CountMismatch,
    ImageCountMismatch,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Archive (exit 9)
    ArchiveError,

    // Internal (exit 1)
    InternalError,
    InvalidHandle,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ModelNotFound => "MODEL_NOT_FOUND",
            Self::ComponentNotFound => "COMPONENT_NOT_FOUND",
            Self::ImageNotFound => "IMAGE_NOT_FOUND",
            Self::UnknownKind => "UNKNOWN_KIND",
            Self::WrongKind => "WRONG_KIND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DanglingReference => "DANGLING_REFERENCE",
            Self::UnknownFolder => "UNKNOWN_FOLDER",
            Self::CountMismatch => "COUNT_MISMATCH",
            Self::ImageCountMismatch => "IMAGE_COUNT_MISMATCH",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ArchiveError => "ARCHIVE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::InvalidHandle => "INVALID_HANDLE",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError | Self::InvalidHandle => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::ModelNotFound | Self::ComponentNotFound | Self::ImageNotFound => 3,
            Self::UnknownKind | Self::WrongKind | Self::InvalidArgument => 4,
            Self::DanglingReference
            | Self::UnknownFolder
            | Self::CountMismatch
            | Self::ImageCountMismatch => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::ArchiveError => 9,
        }
    }

    /// Whether retrying the same operation with corrected input may succeed.
    ///
    /// Integrity failures are never retryable: the store content itself is
    /// inconsistent and the partially built model must be discarded.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::UnknownKind | Self::WrongKind)
    }
}

// ── Count discrepancy ─────────────────────────────────────────

/// One category whose imported count differs from the count announced
/// by the store before streaming started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDiscrepancy {
    pub category: &'static str,
    pub expected: usize,
    pub imported: usize,
}

impl fmt::Display for CountDiscrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} imported instead of the {} that were expected",
            self.imported, self.category, self.expected
        )
    }
}

fn version_suffix(version: Option<&i64>) -> String {
    version.map_or_else(String::new, |v| format!(" and version={v}"))
}

fn join_discrepancies(items: &[CountDiscrepancy]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while importing or inspecting a stored model.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database not found at {path}: run `archisync init` first")]
    NotInitialized { path: PathBuf },

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Model with id={id}{} has not been found in the database", version_suffix(.version.as_ref()))]
    ModelNotFound { id: String, version: Option<i64> },

    #[error("{kind} with id={id}{} has not been found in the database", version_suffix(.version.as_ref()))]
    ComponentNotFound {
        kind: Kind,
        id: String,
        version: Option<i64>,
    },

    #[error("Image {path} has not been found in the database")]
    ImageNotFound { path: String },

    #[error("{kind} {component} references {reference} which is not part of the model")]
    DanglingReference {
        kind: Kind,
        component: String,
        reference: String,
    },

    #[error("Import count mismatch: {}", join_discrepancies(.0))]
    CountMismatch(Vec<CountDiscrepancy>),

    #[error("{imported} images imported instead of the {expected} that were expected")]
    ImageCountMismatch { expected: usize, imported: usize },

    #[error("Unknown component class: {class}")]
    UnknownKind { class: String },

    #[error("{id} is a {class}, expected a {expected}")]
    WrongKind {
        id: String,
        class: String,
        expected: Kind,
    },

    #[error("No component at handle {0}")]
    InvalidHandle(usize),

    #[error("Don't know where to create {kind} {id}")]
    UnknownFolder { kind: Kind, id: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized { .. } => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::ModelNotFound { .. } => ErrorCode::ModelNotFound,
            Self::ComponentNotFound { .. } => ErrorCode::ComponentNotFound,
            Self::ImageNotFound { .. } => ErrorCode::ImageNotFound,
            Self::DanglingReference { .. } => ErrorCode::DanglingReference,
            Self::CountMismatch(_) => ErrorCode::CountMismatch,
            Self::ImageCountMismatch { .. } => ErrorCode::ImageCountMismatch,
            Self::UnknownKind { .. } => ErrorCode::UnknownKind,
            Self::WrongKind { .. } => ErrorCode::WrongKind,
            Self::InvalidHandle(_) => ErrorCode::InvalidHandle,
            Self::UnknownFolder { .. } => ErrorCode::UnknownFolder,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Archive(_) => ErrorCode::ArchiveError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized { path } => Some(format!(
                "Run `archisync --db {} init` to create the schema",
                path.display()
            )),

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reapply the schema.",
                path.display()
            )),

            Self::ModelNotFound { .. } => {
                Some("Use `archisync models` to list the stored models and versions.".to_string())
            }

            Self::ComponentNotFound { kind, id, .. } => Some(format!(
                "No {kind} '{id}' in the store. Pass version 0 to fetch the latest version."
            )),

            Self::ImageNotFound { .. } => {
                Some("Use `archisync images` to list the stored image paths.".to_string())
            }

            Self::DanglingReference { .. } | Self::CountMismatch(_) => Some(
                "The stored model is inconsistent; discard the partially imported model."
                    .to_string(),
            ),

            Self::UnknownKind { .. } => Some(
                "Known classes are the ArchiMate 3 element, relationship, diagram and canvas classes."
                    .to_string(),
            ),

            Self::Config(msg) if msg.contains("dialect") => Some(
                "Valid dialects: sqlite, postgresql, mysql, ms-sql, oracle".to_string(),
            ),

            Self::ImageCountMismatch { .. }
            | Self::UnknownFolder { .. }
            | Self::WrongKind { .. }
            | Self::InvalidHandle(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Archive(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
