//! Identifier generation for copied components.

use std::fmt;

/// Mints identifiers for components created in copy mode.
pub trait IdGenerator: fmt::Debug {
    fn generate(&mut self) -> String;
}

/// Archi style identifiers: `id-` followed by a UUID v4 without dashes.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&mut self) -> String {
        format!("id-{}", uuid::Uuid::new_v4().simple())
    }
}

/// Deterministic `prefix-N` identifiers.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: u64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
