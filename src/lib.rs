//! archisync - versioned import of ArchiMate models
//!
//! This crate reads models stored, version by version, in a relational
//! database and materializes them as an in-memory model graph.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Model graph, components, registry and version records
//! - [`storage`] - SQLite store access, schema and dialects
//! - [`sync`] - Streaming import, relocation, checksums and sync status
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
