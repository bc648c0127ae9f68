//! Component kinds, folder types and class classification.
//!
//! The store keeps the ArchiMate class name of every element,
//! relationship, view, view object and view connection in its `class`
//! column. Classification maps those names onto the closed set of kinds
//! the registry knows how to handle.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The six component categories of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Element,
    Relationship,
    Folder,
    View,
    ViewObject,
    ViewConnection,
}

impl Kind {
    pub const ALL: [Self; 6] = [
        Self::Folder,
        Self::Element,
        Self::Relationship,
        Self::View,
        Self::ViewObject,
        Self::ViewConnection,
    ];

    /// Human readable name, also used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Relationship => "relationship",
            Self::Folder => "folder",
            Self::View => "view",
            Self::ViewObject => "view object",
            Self::ViewConnection => "view connection",
        }
    }

    /// Table holding one row per (id, version) of this kind.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Element => "elements",
            Self::Relationship => "relationships",
            Self::Folder => "folders",
            Self::View => "views",
            Self::ViewObject => "views_objects",
            Self::ViewConnection => "views_connections",
        }
    }

    /// Table linking a component version to a model version, with the
    /// component id column of that table.
    ///
    /// View objects and connections belong to a view rather than a model.
    #[must_use]
    pub const fn model_association(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Element => Some(("elements_in_model", "element_id")),
            Self::Relationship => Some(("relationships_in_model", "relationship_id")),
            Self::Folder => Some(("folders_in_model", "folder_id")),
            Self::View => Some(("views_in_model", "view_id")),
            Self::ViewObject | Self::ViewConnection => None,
        }
    }

    /// Parse a kind name as accepted on the command line.
    pub fn parse(input: &str) -> Result<Self> {
        match input.to_lowercase().replace(['-', ' '], "_").as_str() {
            "element" | "elements" => Ok(Self::Element),
            "relationship" | "relationships" => Ok(Self::Relationship),
            "folder" | "folders" => Ok(Self::Folder),
            "view" | "views" | "diagram" => Ok(Self::View),
            "view_object" | "views_objects" | "object" => Ok(Self::ViewObject),
            "view_connection" | "views_connections" | "connection" => Ok(Self::ViewConnection),
            _ => Err(Error::InvalidArgument(format!("unknown component kind '{input}'"))),
        }
    }

    /// Classify a stored class name.
    pub fn classify(class: &str) -> Result<Self> {
        let bare = class.strip_prefix("com.archimatetool.model.I").unwrap_or(class);
        if ELEMENT_LAYERS.contains_key(bare) {
            Ok(Self::Element)
        } else if RELATIONSHIP_CLASSES.contains(bare) {
            Ok(Self::Relationship)
        } else if VIEW_CLASSES.contains(bare) {
            Ok(Self::View)
        } else if VIEW_OBJECT_CLASSES.contains(bare) {
            Ok(Self::ViewObject)
        } else if CONNECTION_CLASSES.contains(bare) {
            Ok(Self::ViewConnection)
        } else if bare == "Folder" {
            Ok(Self::Folder)
        } else {
            Err(Error::UnknownKind {
                class: class.to_string(),
            })
        }
    }

    /// Classify a stored class name and require it to be of this kind.
    pub fn expect_class(self, class: &str) -> Result<()> {
        if Self::classify(class)? == self {
            Ok(())
        } else {
            Err(Error::UnknownKind {
                class: format!("{class} (expected a {self} class)"),
            })
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folder type with the integer values persisted in the `type` and
/// `root_type` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    #[default]
    User,
    Business,
    Application,
    Technology,
    Relations,
    Other,
    Diagrams,
    Derived,
    Motivation,
    ImplementationMigration,
    Strategy,
}

impl FolderType {
    /// Root folders in the order a fresh model lays them out.
    pub const ROOTS: [Self; 9] = [
        Self::Strategy,
        Self::Business,
        Self::Application,
        Self::Technology,
        Self::Motivation,
        Self::ImplementationMigration,
        Self::Other,
        Self::Relations,
        Self::Diagrams,
    ];

    /// Persisted integer value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        match self {
            Self::User => 0,
            Self::Business => 1,
            Self::Application => 2,
            Self::Technology => 3,
            Self::Relations => 4,
            Self::Other => 5,
            Self::Diagrams => 6,
            Self::Derived => 7,
            Self::Motivation => 8,
            Self::ImplementationMigration => 9,
            Self::Strategy => 10,
        }
    }

    /// Decode a persisted value. Unknown values map to `User`.
    #[must_use]
    pub const fn from_value(value: i64) -> Self {
        match value {
            1 => Self::Business,
            2 => Self::Application,
            3 => Self::Technology,
            4 => Self::Relations,
            5 => Self::Other,
            6 => Self::Diagrams,
            7 => Self::Derived,
            8 => Self::Motivation,
            9 => Self::ImplementationMigration,
            10 => Self::Strategy,
            _ => Self::User,
        }
    }

    /// Default display name of a root folder of this type.
    #[must_use]
    pub const fn default_name(&self) -> &'static str {
        match self {
            Self::User => "Folder",
            Self::Business => "Business",
            Self::Application => "Application",
            Self::Technology => "Technology & Physical",
            Self::Relations => "Relations",
            Self::Other => "Other",
            Self::Diagrams => "Views",
            Self::Derived => "Derived Relations",
            Self::Motivation => "Motivation",
            Self::ImplementationMigration => "Implementation & Migration",
            Self::Strategy => "Strategy",
        }
    }

    /// Root folder type that receives components of the given class when
    /// they have no explicit parent folder.
    #[must_use]
    pub fn default_for(kind: Kind, class: &str) -> Option<Self> {
        match kind {
            Kind::Element => {
                let bare = class.strip_prefix("com.archimatetool.model.I").unwrap_or(class);
                ELEMENT_LAYERS.get(bare).copied()
            }
            Kind::Relationship => Some(Self::Relations),
            Kind::View => Some(Self::Diagrams),
            Kind::Folder | Kind::ViewObject | Kind::ViewConnection => None,
        }
    }
}

// ── Class tables ──────────────────────────────────────────────

/// Element classes and the root folder of their layer.
static ELEMENT_LAYERS: LazyLock<HashMap<&str, FolderType>> = LazyLock::new(|| {
    let layers: [(FolderType, &[&str]); 7] = [
        (
            FolderType::Business,
            &[
                "BusinessActor",
                "BusinessRole",
                "BusinessCollaboration",
                "BusinessInterface",
                "BusinessProcess",
                "BusinessFunction",
                "BusinessInteraction",
                "BusinessEvent",
                "BusinessService",
                "BusinessObject",
                "Contract",
                "Representation",
                "Product",
            ],
        ),
        (
            FolderType::Application,
            &[
                "ApplicationComponent",
                "ApplicationCollaboration",
                "ApplicationInterface",
                "ApplicationFunction",
                "ApplicationInteraction",
                "ApplicationProcess",
                "ApplicationEvent",
                "ApplicationService",
                "DataObject",
            ],
        ),
        (
            FolderType::Technology,
            &[
                "Node",
                "Device",
                "SystemSoftware",
                "TechnologyCollaboration",
                "TechnologyInterface",
                "Path",
                "CommunicationNetwork",
                "TechnologyFunction",
                "TechnologyProcess",
                "TechnologyInteraction",
                "TechnologyEvent",
                "TechnologyService",
                "Artifact",
                "Equipment",
                "Facility",
                "DistributionNetwork",
                "Material",
            ],
        ),
        (
            FolderType::Motivation,
            &[
                "Stakeholder",
                "Driver",
                "Assessment",
                "Goal",
                "Outcome",
                "Principle",
                "Requirement",
                "Constraint",
                "Meaning",
                "Value",
            ],
        ),
        (
            FolderType::Strategy,
            &["Resource", "Capability", "ValueStream", "CourseOfAction"],
        ),
        (
            FolderType::ImplementationMigration,
            &[
                "WorkPackage",
                "Deliverable",
                "ImplementationEvent",
                "Plateau",
                "Gap",
            ],
        ),
        (FolderType::Other, &["Location", "Grouping", "Junction"]),
    ];

    layers
        .into_iter()
        .flat_map(|(folder, classes)| classes.iter().map(move |class| (*class, folder)))
        .collect()
});

static RELATIONSHIP_CLASSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    [
        "CompositionRelationship",
        "AggregationRelationship",
        "AssignmentRelationship",
        "RealizationRelationship",
        "ServingRelationship",
        "AccessRelationship",
        "InfluenceRelationship",
        "TriggeringRelationship",
        "FlowRelationship",
        "SpecializationRelationship",
        "AssociationRelationship",
    ]
    .into_iter()
    .collect()
});

static VIEW_CLASSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    ["ArchimateDiagramModel", "CanvasModel", "SketchModel"]
        .into_iter()
        .collect()
});

static VIEW_OBJECT_CLASSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    [
        "DiagramModelArchimateObject",
        "DiagramModelGroup",
        "DiagramModelNote",
        "DiagramModelReference",
        "CanvasModelBlock",
        "CanvasModelImage",
        "CanvasModelSticky",
        "SketchModelActor",
        "SketchModelSticky",
    ]
    .into_iter()
    .collect()
});

static CONNECTION_CLASSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    [
        "DiagramModelArchimateConnection",
        "DiagramModelConnection",
        "CanvasModelConnection",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_classes() {
        assert_eq!(Kind::classify("BusinessActor").unwrap(), Kind::Element);
        assert_eq!(
            Kind::classify("com.archimatetool.model.IBusinessActor").unwrap(),
            Kind::Element
        );
        assert_eq!(
            Kind::classify("FlowRelationship").unwrap(),
            Kind::Relationship
        );
        assert_eq!(Kind::classify("SketchModel").unwrap(), Kind::View);
        assert_eq!(
            Kind::classify("DiagramModelNote").unwrap(),
            Kind::ViewObject
        );
        assert_eq!(
            Kind::classify("DiagramModelArchimateConnection").unwrap(),
            Kind::ViewConnection
        );
    }

    #[test]
    fn test_classify_unknown_class() {
        let err = Kind::classify("Spaceship").unwrap_err();
        assert!(matches!(err, Error::UnknownKind { .. }));
    }

    #[test]
    fn test_expect_class_rejects_other_kind() {
        assert!(Kind::Element.expect_class("Goal").is_ok());
        assert!(Kind::Element.expect_class("FlowRelationship").is_err());
    }

    #[test]
    fn test_folder_type_values_round_trip() {
        for folder in FolderType::ROOTS {
            assert_eq!(FolderType::from_value(folder.value()), folder);
        }
        assert_eq!(FolderType::from_value(42), FolderType::User);
    }

    #[test]
    fn test_default_folder_by_layer() {
        assert_eq!(
            FolderType::default_for(Kind::Element, "Capability"),
            Some(FolderType::Strategy)
        );
        assert_eq!(
            FolderType::default_for(Kind::Element, "Node"),
            Some(FolderType::Technology)
        );
        assert_eq!(
            FolderType::default_for(Kind::Relationship, "FlowRelationship"),
            Some(FolderType::Relations)
        );
        assert_eq!(FolderType::default_for(Kind::ViewObject, "DiagramModelNote"), None);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(Kind::parse("view-object").unwrap(), Kind::ViewObject);
        assert_eq!(Kind::parse("Elements").unwrap(), Kind::Element);
        assert!(Kind::parse("widget").is_err());
    }
}
