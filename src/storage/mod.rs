//! Relational store access.
//!
//! # Submodules
//!
//! - [`dialect`] - Per-database SQL substitutions
//! - [`row`] - Owned result rows and cursors
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Connection wrapper

pub mod dialect;
pub mod row;
pub mod schema;
pub mod sqlite;

pub use dialect::Dialect;
pub use row::{Cursor, Row};
pub use sqlite::Database;
