//! In-memory model graph.
//!
//! - `Model`: the aggregate root owning every component
//! - `Component` / `ComponentBody`: one versioned artefact and its kind-specific fields
//! - `Registry`: identifier indexes and deferred references
//! - `VersionRecord` / `VersionSet`: version roles
//! - `Kind` / `FolderType`: classification

pub mod archimate;
pub mod component;
pub mod ids;
pub mod kind;
pub mod registry;
pub mod version;

pub use archimate::{End, Model};
pub use component::{
    Bendpoint, Bounds, Component, ComponentBody, Element, Folder, Handle, Property, Ref,
    Relationship, View, ViewConnection, ViewObject,
};
pub use ids::{IdGenerator, SequentialGenerator, UuidGenerator};
pub use kind::{FolderType, Kind};
pub use registry::Registry;
pub use version::{VersionRecord, VersionSet};
