//! Command implementations.

pub mod completions;
pub mod images;
pub mod import;
pub mod init;
pub mod models;
pub mod show;
pub mod status;
pub mod version;
