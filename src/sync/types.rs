//! Types shared by the import pipeline and sync status.

use std::fmt;

use serde::Serialize;

use crate::error::CountDiscrepancy;

/// Streams of the import pipeline, in the order they are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Folders,
    Elements,
    Relationships,
    Views,
    ViewObjects,
    ViewConnections,
    Images,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Folders,
        Self::Elements,
        Self::Relationships,
        Self::Views,
        Self::ViewObjects,
        Self::ViewConnections,
        Self::Images,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Folders => "folders",
            Self::Elements => "elements",
            Self::Relationships => "relationships",
            Self::Views => "views",
            Self::ViewObjects => "views objects",
            Self::ViewConnections => "views connections",
            Self::Images => "images",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one category's result stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorState {
    #[default]
    NotStarted,
    /// The request ran; no row consumed yet.
    Prepared,
    Streaming,
    Exhausted,
}

/// Expected versus imported rows of one category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Announced by the COUNT query before streaming.
    pub expected: usize,
    pub imported: usize,
}

impl CategoryCount {
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.expected == self.imported
    }
}

/// Statistics for an import.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    pub folders: CategoryCount,
    pub elements: CategoryCount,
    pub relationships: CategoryCount,
    pub views: CategoryCount,
    pub view_objects: CategoryCount,
    pub view_connections: CategoryCount,
    pub images: CategoryCount,
}

impl ImportStats {
    #[must_use]
    pub const fn get(&self, category: Category) -> &CategoryCount {
        match category {
            Category::Folders => &self.folders,
            Category::Elements => &self.elements,
            Category::Relationships => &self.relationships,
            Category::Views => &self.views,
            Category::ViewObjects => &self.view_objects,
            Category::ViewConnections => &self.view_connections,
            Category::Images => &self.images,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryCount {
        match category {
            Category::Folders => &mut self.folders,
            Category::Elements => &mut self.elements,
            Category::Relationships => &mut self.relationships,
            Category::Views => &mut self.views,
            Category::ViewObjects => &mut self.view_objects,
            Category::ViewConnections => &mut self.view_connections,
            Category::Images => &mut self.images,
        }
    }

    /// Components to import, images excluded.
    #[must_use]
    pub fn total_expected(&self) -> usize {
        Category::ALL
            .iter()
            .filter(|c| **c != Category::Images)
            .map(|c| self.get(*c).expected)
            .sum()
    }

    /// Components imported so far, images excluded.
    #[must_use]
    pub fn total_imported(&self) -> usize {
        Category::ALL
            .iter()
            .filter(|c| **c != Category::Images)
            .map(|c| self.get(*c).imported)
            .sum()
    }

    /// Every component category whose imported count is off.
    #[must_use]
    pub fn discrepancies(&self) -> Vec<CountDiscrepancy> {
        Category::ALL
            .iter()
            .filter(|c| **c != Category::Images)
            .filter(|c| !self.get(**c).matches())
            .map(|c| CountDiscrepancy {
                category: c.as_str(),
                expected: self.get(*c).expected,
                imported: self.get(*c).imported,
            })
            .collect()
    }
}

/// Cursor state of every category.
#[derive(Debug, Default, Clone, Copy)]
pub struct CursorStates([CursorState; 7]);

impl CursorStates {
    #[must_use]
    pub const fn get(&self, category: Category) -> CursorState {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: Category, state: CursorState) {
        self.0[category.index()] = state;
    }
}

/// Whether a component would need a new version row on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Never persisted.
    New,
    /// Current checksum differs from the loaded one.
    Updated,
    Unchanged,
}

/// Per-kind tally of component statuses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ComponentStatus) {
        match status {
            ComponentStatus::New => self.new += 1,
            ComponentStatus::Updated => self.updated += 1,
            ComponentStatus::Unchanged => self.unchanged += 1,
        }
    }

    /// Components that would be written on export.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.new + self.updated
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.new + self.updated + self.unchanged
    }
}

/// Sync status of a whole model.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncStatus {
    pub model_id: String,
    pub model_version: i64,
    pub latest_database_version: i64,
    pub folders: StatusCounts,
    pub elements: StatusCounts,
    pub relationships: StatusCounts,
    pub views: StatusCounts,
    pub view_objects: StatusCounts,
    pub view_connections: StatusCounts,
}

impl SyncStatus {
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.folders.pending()
            + self.elements.pending()
            + self.relationships.pending()
            + self.views.pending()
            + self.view_objects.pending()
            + self.view_connections.pending()
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.pending() == 0
    }
}

/// One stored model version.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub id: String,
    pub version: i64,
    pub name: String,
    pub created_on: Option<chrono::DateTime<chrono::Utc>>,
    pub checksum: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_stats_totals_exclude_images() {
        let mut stats = ImportStats::default();
        stats.elements = CategoryCount { expected: 3, imported: 3 };
        stats.images = CategoryCount { expected: 2, imported: 0 };
        assert_eq!(stats.total_expected(), 3);
        assert_eq!(stats.total_imported(), 3);
        assert!(stats.discrepancies().is_empty());
    }

    #[test]
    fn test_discrepancies_list_every_category() {
        let mut stats = ImportStats::default();
        stats.get_mut(Category::Folders).expected = 2;
        stats.get_mut(Category::Views).expected = 1;
        let off = stats.discrepancies();
        assert_eq!(off.len(), 2);
        assert_eq!(off[0].category, "folders");
        assert_eq!(off[1].category, "views");
    }

    #[test]
    fn test_cursor_states() {
        let mut states = CursorStates::default();
        assert_eq!(states.get(Category::Views), CursorState::NotStarted);
        states.set(Category::Views, CursorState::Streaming);
        assert_eq!(states.get(Category::Views), CursorState::Streaming);
        assert_eq!(states.get(Category::Elements), CursorState::NotStarted);
    }

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.record(ComponentStatus::New);
        counts.record(ComponentStatus::Unchanged);
        counts.record(ComponentStatus::Updated);
        assert_eq!(counts.pending(), 2);
        assert_eq!(counts.total(), 3);
    }
}
