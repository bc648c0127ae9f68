//! Version records.
//!
//! Every versioned artefact carries four version roles:
//! - `initial`: the version it had when loaded from the store
//! - `current`: the in-memory state, whose checksum is recomputed by
//!   `Model::count_object`
//! - `database`: the version found in the store at last comparison
//! - `latest_database`: the newest version present in the store
//!
//! A component that has never been persisted has `initial.version == 0`
//! and no initial checksum.
//!
//! Stored checksums are kept as read. Change detection compares the
//! current checksum with `baseline`, the checksum computed locally right
//! after the component was imported.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One (version number, checksum, timestamp) triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub version: i64,
    pub checksum: Option<String>,
    /// Checksum of the view content, recorded on view rows only.
    pub container_checksum: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl VersionRecord {
    #[must_use]
    pub fn new(version: i64, checksum: Option<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            version,
            checksum,
            container_checksum: None,
            timestamp,
        }
    }

    /// Record for something that has not been persisted yet.
    #[must_use]
    pub fn unpersisted() -> Self {
        Self {
            timestamp: Some(Utc::now()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_container_checksum(mut self, checksum: Option<String>) -> Self {
        self.container_checksum = checksum;
        self
    }

    /// Whether this record points to a stored row.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.version > 0
    }
}

/// The four version roles of a component or model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionSet {
    pub initial: VersionRecord,
    pub current: VersionRecord,
    pub database: VersionRecord,
    pub latest_database: VersionRecord,
    /// Locally computed checksum of the component as imported.
    pub baseline: Option<String>,
}

impl VersionSet {
    /// All four roles set from a stored row: the component is in sync.
    #[must_use]
    pub fn from_store(record: VersionRecord) -> Self {
        Self {
            initial: record.clone(),
            current: record.clone(),
            database: record.clone(),
            latest_database: record,
            baseline: None,
        }
    }

    /// Roles of a freshly minted copy: nothing persisted yet.
    #[must_use]
    pub fn copy() -> Self {
        let fresh = VersionRecord::unpersisted();
        Self {
            initial: fresh.clone(),
            current: fresh,
            ..Self::default()
        }
    }

    /// Overwrite every role with the same stored record.
    pub fn set_all(&mut self, record: VersionRecord) {
        *self = Self::from_store(record);
    }

    /// Whether the component has never been persisted.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        !self.initial.is_persisted()
    }
}
