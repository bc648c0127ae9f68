//! Versioned import from the relational store.
//!
//! - **Import**: stream a stored model snapshot into a [`Model`](crate::model::Model),
//!   one category at a time, or pull single components by identifier
//! - **Relocation**: move components to the folders of the newest snapshot
//! - **Hashing**: SHA256 checksums for change detection
//! - **Status**: which components would need a new version on export
//!
//! # Example
//!
//! ```ignore
//! use archisync::model::Model;
//! use archisync::storage::Database;
//! use archisync::sync::{ImportConnection, MemoryArchive};
//!
//! let mut connection = ImportConnection::new(Database::open(path)?);
//! let mut model = Model::new("id-model").with_version(0);
//! let mut archive = MemoryArchive::new();
//! let stats = connection.import_full_model(&mut model, &mut archive)?;
//! ```

mod archive;
#[cfg(test)]
mod fixture;
pub mod hash;
mod import;
mod mapping;
mod policy;
mod relocate;
mod single;
mod status;
mod types;

pub use archive::{ArchiveManager, MemoryArchive};
pub use hash::{content_hash, has_changed};
pub use import::{ImportConnection, StoredObject};
pub use policy::VersionSelector;
pub use status::{component_status, print_status, sync_status};
pub use types::{
    Category, CategoryCount, ComponentStatus, CursorState, ImportStats, ModelSummary,
    StatusCounts, SyncStatus,
};
