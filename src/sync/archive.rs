//! Destination for image bytes fetched during import.

use indexmap::IndexMap;

use crate::error::Result;

/// Receives the binary content referenced by view objects.
pub trait ArchiveManager {
    /// Store `bytes` under `path` and return the path it was stored at.
    fn add_byte_content_entry(&mut self, path: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Keeps image content in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    entries: IndexMap<String, Vec<u8>>,
}

impl MemoryArchive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveManager for MemoryArchive {
    fn add_byte_content_entry(&mut self, path: &str, bytes: Vec<u8>) -> Result<String> {
        self.entries.insert(path.to_string(), bytes);
        Ok(path.to_string())
    }
}
