//! Model components.
//!
//! A `Component` holds what every versioned artefact shares (identifier,
//! class, versions, properties, parent) and a `ComponentBody` with the
//! fields specific to its kind. Components live in the arena owned by
//! [`Model`](super::Model) and refer to each other through [`Handle`]s.

use serde::Serialize;

use super::kind::{FolderType, Kind};
use super::version::VersionSet;

/// Index of a component in the model arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Handle(pub(crate) usize);

impl Handle {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A reference to another component.
///
/// Import binds a reference as soon as its target is materialized;
/// otherwise the identifier is kept and registered for the second phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Ref {
    Resolved(Handle),
    Pending(String),
}

impl Ref {
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        match self {
            Self::Resolved(handle) => Some(*handle),
            Self::Pending(_) => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl Default for Ref {
    fn default() -> Self {
        Self::Pending(String::new())
    }
}

/// A key/value pair, ordered by its rank in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: Option<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bendpoint {
    pub start_x: i64,
    pub start_y: i64,
    pub end_x: i64,
    pub end_y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Default for Bounds {
    /// Negative size lets the renderer pick the class default.
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: -1,
            height: -1,
        }
    }
}

// ── Kind-specific bodies ──────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct Element {
    pub name: String,
    pub documentation: Option<String>,
    /// Junction type ("and"/"or"), empty for other classes.
    pub element_type: Option<String>,
    pub source_relationships: Vec<Handle>,
    pub target_relationships: Vec<Handle>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Relationship {
    pub name: String,
    pub documentation: Option<String>,
    pub strength: Option<String>,
    pub access_type: i64,
    pub source: Ref,
    pub target: Ref,
    /// Relationships may themselves be endpoints of relationships.
    pub source_relationships: Vec<Handle>,
    pub target_relationships: Vec<Handle>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Folder {
    pub name: String,
    pub documentation: Option<String>,
    pub folder_type: FolderType,
    /// Type of the root folder this folder descends from.
    pub root_type: FolderType,
    pub folders: Vec<Handle>,
    pub elements: Vec<Handle>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct View {
    pub name: String,
    pub documentation: Option<String>,
    pub viewpoint: Option<String>,
    pub background: i64,
    pub connection_router_type: i64,
    pub hint_content: Option<String>,
    pub hint_title: Option<String>,
    pub children: Vec<Handle>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewObject {
    /// Element shown by an ArchiMate diagram object.
    pub concept: Option<Handle>,
    /// View referenced by a diagram reference.
    pub diagram_ref: Option<Handle>,
    pub object_type: i64,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub content: Option<String>,
    pub notes: Option<String>,
    pub border_color: Option<String>,
    pub border_type: i64,
    pub fill_color: Option<String>,
    pub line_color: Option<String>,
    pub line_width: i64,
    pub font: Option<String>,
    pub font_color: Option<String>,
    pub hint_content: Option<String>,
    pub hint_title: Option<String>,
    pub is_locked: Option<bool>,
    pub image_path: Option<String>,
    pub image_position: i64,
    pub text_alignment: i64,
    pub text_position: i64,
    pub bounds: Bounds,
    pub children: Vec<Handle>,
    pub source_connections: Vec<Handle>,
    pub target_connections: Vec<Handle>,
    /// Enclosing view, set when the object is counted.
    pub view: Option<Handle>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewConnection {
    /// Relationship drawn by an ArchiMate connection.
    pub concept: Option<Handle>,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub is_locked: Option<bool>,
    pub line_color: Option<String>,
    pub line_width: i64,
    pub font: Option<String>,
    pub font_color: Option<String>,
    pub connection_type: i64,
    pub text_position: i64,
    pub source: Ref,
    pub target: Ref,
    pub bendpoints: Vec<Bendpoint>,
    /// Connections may connect to connections.
    pub source_connections: Vec<Handle>,
    pub target_connections: Vec<Handle>,
    pub view: Option<Handle>,
}

/// Kind-specific part of a component.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentBody {
    Element(Element),
    Relationship(Relationship),
    Folder(Folder),
    View(View),
    ViewObject(ViewObject),
    ViewConnection(ViewConnection),
}

impl ComponentBody {
    /// Empty body of the given kind.
    #[must_use]
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Element => Self::Element(Element::default()),
            Kind::Relationship => Self::Relationship(Relationship::default()),
            Kind::Folder => Self::Folder(Folder::default()),
            Kind::View => Self::View(View::default()),
            Kind::ViewObject => Self::ViewObject(ViewObject::default()),
            Kind::ViewConnection => Self::ViewConnection(ViewConnection::default()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Element(_) => Kind::Element,
            Self::Relationship(_) => Kind::Relationship,
            Self::Folder(_) => Kind::Folder,
            Self::View(_) => Kind::View,
            Self::ViewObject(_) => Kind::ViewObject,
            Self::ViewConnection(_) => Kind::ViewConnection,
        }
    }
}

// ── Component ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Component {
    id: String,
    pub class: String,
    pub version: VersionSet,
    pub properties: Vec<Property>,
    /// Containing folder, view or view object.
    pub parent: Option<Handle>,
    pub body: ComponentBody,
}

impl Component {
    pub fn new(id: impl Into<String>, class: impl Into<String>, body: ComponentBody) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            version: VersionSet::default(),
            properties: Vec::new(),
            parent: None,
            body,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.body.kind()
    }

    /// Display name, empty when the kind has none.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.body {
            ComponentBody::Element(e) => &e.name,
            ComponentBody::Relationship(r) => &r.name,
            ComponentBody::Folder(f) => &f.name,
            ComponentBody::View(v) => &v.name,
            ComponentBody::ViewObject(o) => o.name.as_deref().unwrap_or_default(),
            ComponentBody::ViewConnection(c) => c.name.as_deref().unwrap_or_default(),
        }
    }

    /// `kind:"name"(id)` form used in log lines.
    #[must_use]
    pub fn debug_name(&self) -> String {
        format!("{}:\"{}\"({})", self.kind(), self.name(), self.id)
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match &self.body {
            ComponentBody::Folder(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_folder_mut(&mut self) -> Option<&mut Folder> {
        match &mut self.body {
            ComponentBody::Folder(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match &self.body {
            ComponentBody::Relationship(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_view_object(&self) -> Option<&ViewObject> {
        match &self.body {
            ComponentBody::ViewObject(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_view_connection(&self) -> Option<&ViewConnection> {
        match &self.body {
            ComponentBody::ViewConnection(c) => Some(c),
            _ => None,
        }
    }

    /// Relationships having this concept as source and as target.
    ///
    /// `None` for anything that is not an element or a relationship.
    pub fn relationship_links_mut(&mut self) -> Option<(&mut Vec<Handle>, &mut Vec<Handle>)> {
        match &mut self.body {
            ComponentBody::Element(e) => {
                Some((&mut e.source_relationships, &mut e.target_relationships))
            }
            ComponentBody::Relationship(r) => {
                Some((&mut r.source_relationships, &mut r.target_relationships))
            }
            _ => None,
        }
    }

    /// Connections leaving and entering this view object or connection.
    pub fn connection_links_mut(&mut self) -> Option<(&mut Vec<Handle>, &mut Vec<Handle>)> {
        match &mut self.body {
            ComponentBody::ViewObject(o) => {
                Some((&mut o.source_connections, &mut o.target_connections))
            }
            ComponentBody::ViewConnection(c) => {
                Some((&mut c.source_connections, &mut c.target_connections))
            }
            _ => None,
        }
    }

    /// Contained components of a folder, view or view object, in order.
    #[must_use]
    pub fn children(&self) -> Vec<Handle> {
        match &self.body {
            ComponentBody::Folder(f) => f.folders.iter().chain(&f.elements).copied().collect(),
            ComponentBody::View(v) => v.children.clone(),
            ComponentBody::ViewObject(o) => o.children.clone(),
            _ => Vec::new(),
        }
    }
}
