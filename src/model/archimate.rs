//! The model aggregate.
//!
//! A `Model` owns every component of one imported model in an arena,
//! the root folders, the model-level metadata and the [`Registry`] that
//! indexes components by identifier. All tree surgery (attaching to
//! folders and containers, binding relationship and connection
//! endpoints) goes through the methods here so that forward and inverse
//! links stay consistent.

use tracing::trace;

use super::component::{Component, ComponentBody, Folder, Handle, Property, Ref};
use super::ids::{IdGenerator, UuidGenerator};
use super::kind::{FolderType, Kind};
use super::registry::Registry;
use super::version::VersionRecord;
use crate::error::{Error, Result};

/// Which endpoint of a relationship or connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Source,
    Target,
}

impl End {
    fn pick<'a>(self, links: (&'a mut Vec<Handle>, &'a mut Vec<Handle>)) -> &'a mut Vec<Handle> {
        match self {
            Self::Source => links.0,
            Self::Target => links.1,
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub purpose: Option<String>,
    pub properties: Vec<Property>,
    pub metadata: Vec<Property>,
    /// Model version loaded from the store, 0 for "latest".
    pub initial_version: VersionRecord,
    /// Version the next export would write.
    pub current_version: VersionRecord,
    /// Newest model version present in the store.
    pub latest_database_version: VersionRecord,
    import_latest_version: bool,
    components: Vec<Component>,
    root_folders: Vec<Handle>,
    pub(crate) registry: Registry,
    ids: Box<dyn IdGenerator>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            purpose: None,
            properties: Vec::new(),
            metadata: Vec::new(),
            initial_version: VersionRecord::default(),
            current_version: VersionRecord::default(),
            latest_database_version: VersionRecord::default(),
            import_latest_version: false,
            components: Vec::new(),
            root_folders: Vec::new(),
            registry: Registry::default(),
            ids: Box::new(UuidGenerator),
        }
    }

    /// Select the stored model version to import. 0 means the latest.
    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.initial_version.version = version;
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Import the latest version of every component instead of the
    /// versions pinned by the model snapshot.
    pub fn set_import_latest_version(&mut self, latest: bool) {
        self.import_latest_version = latest;
    }

    #[must_use]
    pub const fn import_latest_version(&self) -> bool {
        self.import_latest_version
    }

    /// True when the import reflects the newest state in the store, either
    /// because latest component versions were requested or because the
    /// snapshot being imported is itself the newest one.
    #[must_use]
    pub fn is_latest_version_imported(&self) -> bool {
        self.import_latest_version
            || self.initial_version.version == self.latest_database_version.version
    }

    pub fn generate_id(&mut self) -> String {
        self.ids.generate()
    }

    // ── Arena ─────────────────────────────────────────────────

    /// Add a component to the arena. It is not registered until counted.
    pub fn add(&mut self, component: Component) -> Handle {
        let handle = Handle(self.components.len());
        self.components.push(component);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&Component> {
        self.components.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Component> {
        self.components.get_mut(handle.0)
    }

    pub fn component(&self, handle: Handle) -> Result<&Component> {
        self.get(handle).ok_or_else(|| dangling_handle(handle))
    }

    pub fn component_mut(&mut self, handle: Handle) -> Result<&mut Component> {
        self.components
            .get_mut(handle.0)
            .ok_or_else(|| dangling_handle(handle))
    }

    /// Every component in arena order.
    pub fn components(&self) -> impl Iterator<Item = (Handle, &Component)> {
        self.components
            .iter()
            .enumerate()
            .map(|(index, component)| (Handle(index), component))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Look up a registered component of the given kind, or create an empty
    /// one. Returns the handle and whether it was created.
    pub fn upsert(&mut self, kind: Kind, id: &str, class: &str) -> (Handle, bool) {
        if let Some(handle) = self.registry.get(kind, id) {
            if let Some(component) = self.get_mut(handle) {
                class.clone_into(&mut component.class);
            }
            return (handle, false);
        }
        let handle = self.add(Component::new(id, class, ComponentBody::empty(kind)));
        (handle, true)
    }

    // ── Folders ───────────────────────────────────────────────

    #[must_use]
    pub fn root_folders(&self) -> &[Handle] {
        &self.root_folders
    }

    pub fn add_root_folder(&mut self, folder: Handle) -> Result<()> {
        self.detach(folder)?;
        if !self.root_folders.contains(&folder) {
            self.root_folders.push(folder);
        }
        Ok(())
    }

    /// Root folder of the given type.
    #[must_use]
    pub fn root_folder(&self, folder_type: FolderType) -> Option<Handle> {
        self.root_folders.iter().copied().find(|handle| {
            self.get(*handle)
                .and_then(Component::as_folder)
                .is_some_and(|folder| folder.folder_type == folder_type)
        })
    }

    /// Folder receiving a component that has no known parent.
    #[must_use]
    pub fn default_folder_for(&self, kind: Kind, class: &str) -> Option<Handle> {
        FolderType::default_for(kind, class).and_then(|folder_type| self.root_folder(folder_type))
    }

    /// Create any missing standard root folder.
    pub fn create_default_folders(&mut self) -> Result<()> {
        for folder_type in FolderType::ROOTS {
            if self.root_folder(folder_type).is_some() {
                continue;
            }
            let id = self.generate_id();
            let folder = Folder {
                name: folder_type.default_name().to_string(),
                folder_type,
                root_type: folder_type,
                ..Folder::default()
            };
            let mut component = Component::new(id.clone(), "Folder", ComponentBody::Folder(folder));
            component.version.initial = VersionRecord::unpersisted();
            let handle = self.add(component);
            self.add_root_folder(handle)?;
            self.registry.insert(Kind::Folder, id, handle);
        }
        Ok(())
    }

    /// Move `child` (a folder, element, relationship or view) into `folder`.
    pub fn attach_to_folder(&mut self, folder: Handle, child: Handle) -> Result<()> {
        if self.component(child)?.parent == Some(folder) {
            return Ok(());
        }
        let child_kind = self.component(child)?.kind();
        self.detach(child)?;

        let target = self
            .component_mut(folder)?
            .as_folder_mut()
            .ok_or_else(|| not_a_container(folder))?;
        if child_kind == Kind::Folder {
            target.folders.push(child);
        } else {
            target.elements.push(child);
        }
        self.component_mut(child)?.parent = Some(folder);
        Ok(())
    }

    /// Move a view object into a view or another view object.
    pub fn attach_to_container(&mut self, container: Handle, child: Handle) -> Result<()> {
        if self.component(child)?.parent == Some(container) {
            return Ok(());
        }
        self.detach(child)?;
        match &mut self.component_mut(container)?.body {
            ComponentBody::View(view) => view.children.push(child),
            ComponentBody::ViewObject(object) => object.children.push(child),
            _ => return Err(not_a_container(container)),
        }
        self.component_mut(child)?.parent = Some(container);
        Ok(())
    }

    /// Remove `child` from its current parent's content.
    pub fn detach(&mut self, child: Handle) -> Result<()> {
        let Some(parent) = self.component_mut(child)?.parent.take() else {
            return Ok(());
        };
        trace!(child = child.index(), parent = parent.index(), "detaching");
        if let Some(component) = self.get_mut(parent) {
            match &mut component.body {
                ComponentBody::Folder(folder) => {
                    folder.folders.retain(|h| *h != child);
                    folder.elements.retain(|h| *h != child);
                }
                ComponentBody::View(view) => view.children.retain(|h| *h != child),
                ComponentBody::ViewObject(object) => object.children.retain(|h| *h != child),
                _ => {}
            }
        }
        Ok(())
    }

    /// View enclosing a view object, walking up nested containers.
    #[must_use]
    pub fn enclosing_view(&self, handle: Handle) -> Option<Handle> {
        let mut current = self.get(handle)?;
        let mut at = handle;
        loop {
            match current.kind() {
                Kind::View => return Some(at),
                Kind::ViewObject => {
                    at = current.parent?;
                    current = self.get(at)?;
                }
                Kind::ViewConnection => {
                    return current.as_view_connection().and_then(|c| c.view);
                }
                _ => return None,
            }
        }
    }

    /// Every view object in `view` (recursively) showing `concept`.
    #[must_use]
    pub fn objects_showing(&self, view: Handle, concept: Handle) -> Vec<Handle> {
        let mut found = Vec::new();
        let mut pending = self.get(view).map(Component::children).unwrap_or_default();
        while let Some(handle) = pending.pop() {
            let Some(object) = self.get(handle).and_then(Component::as_view_object) else {
                continue;
            };
            if object.concept == Some(concept) {
                found.push(handle);
            }
            pending.extend(object.children.iter().copied());
        }
        found.sort();
        found
    }

    /// Whether a connection drawing `relationship` already exists between
    /// `source` and `target`.
    #[must_use]
    pub fn has_connection(&self, relationship: Handle, source: Handle, target: Handle) -> bool {
        self.get(source)
            .and_then(Component::as_view_object)
            .is_some_and(|object| {
                object.source_connections.iter().any(|c| {
                    self.get(*c)
                        .and_then(Component::as_view_connection)
                        .is_some_and(|conn| {
                            conn.concept == Some(relationship)
                                && conn.target == Ref::Resolved(target)
                        })
                })
            })
    }

    // ── Endpoints ─────────────────────────────────────────────

    /// Bind one end of a relationship to an element or relationship and
    /// record the inverse link.
    pub fn bind_relationship_end(
        &mut self,
        relationship: Handle,
        endpoint: Handle,
        end: End,
    ) -> Result<()> {
        if self.component(relationship)?.kind() != Kind::Relationship {
            return Err(wrong_kind(self.component(relationship)?, Kind::Relationship));
        }
        let endpoint_kind = self.component(endpoint)?.kind();
        if !matches!(endpoint_kind, Kind::Element | Kind::Relationship) {
            return Err(wrong_kind(self.component(endpoint)?, Kind::Element));
        }

        let previous = match &mut self.component_mut(relationship)?.body {
            ComponentBody::Relationship(rel) => {
                let slot = match end {
                    End::Source => &mut rel.source,
                    End::Target => &mut rel.target,
                };
                std::mem::replace(slot, Ref::Resolved(endpoint))
            }
            _ => Ref::default(),
        };
        if let Ref::Resolved(old) = previous {
            if old != endpoint {
                if let Some(links) = self.get_mut(old).and_then(Component::relationship_links_mut) {
                    end.pick(links).retain(|h| *h != relationship);
                }
            }
        }

        if let Some(links) = self.component_mut(endpoint)?.relationship_links_mut() {
            let list = end.pick(links);
            if !list.contains(&relationship) {
                list.push(relationship);
            }
        }
        Ok(())
    }

    /// Bind one end of a view connection to a view object or connection
    /// and record the inverse link.
    pub fn bind_connection_end(
        &mut self,
        connection: Handle,
        endpoint: Handle,
        end: End,
    ) -> Result<()> {
        if self.component(connection)?.kind() != Kind::ViewConnection {
            return Err(wrong_kind(self.component(connection)?, Kind::ViewConnection));
        }
        let endpoint_kind = self.component(endpoint)?.kind();
        if !matches!(endpoint_kind, Kind::ViewObject | Kind::ViewConnection) {
            return Err(wrong_kind(self.component(endpoint)?, Kind::ViewObject));
        }

        let previous = match &mut self.component_mut(connection)?.body {
            ComponentBody::ViewConnection(conn) => {
                let slot = match end {
                    End::Source => &mut conn.source,
                    End::Target => &mut conn.target,
                };
                std::mem::replace(slot, Ref::Resolved(endpoint))
            }
            _ => Ref::default(),
        };
        if let Ref::Resolved(old) = previous {
            if old != endpoint {
                if let Some(links) = self.get_mut(old).and_then(Component::connection_links_mut) {
                    end.pick(links).retain(|h| *h != connection);
                }
            }
        }

        if let Some(links) = self.component_mut(endpoint)?.connection_links_mut() {
            let list = end.pick(links);
            if !list.contains(&connection) {
                list.push(connection);
            }
        }
        Ok(())
    }

    /// Leave one end of a relationship unbound until resolution.
    pub fn set_pending_relationship_end(&mut self, relationship: Handle, id: &str, end: End) -> Result<()> {
        if let ComponentBody::Relationship(rel) = &mut self.component_mut(relationship)?.body {
            let slot = match end {
                End::Source => &mut rel.source,
                End::Target => &mut rel.target,
            };
            *slot = Ref::Pending(id.to_string());
        }
        match end {
            End::Source => self.registry.register_source_relationship(relationship, id),
            End::Target => self.registry.register_target_relationship(relationship, id),
        }
        Ok(())
    }

    /// Leave one end of a view connection unbound until resolution.
    pub fn set_pending_connection_end(&mut self, connection: Handle, id: &str, end: End) -> Result<()> {
        if let ComponentBody::ViewConnection(conn) = &mut self.component_mut(connection)?.body {
            let slot = match end {
                End::Source => &mut conn.source,
                End::Target => &mut conn.target,
            };
            *slot = Ref::Pending(id.to_string());
        }
        match end {
            End::Source => self.registry.register_source_connection(connection, id),
            End::Target => self.registry.register_target_connection(connection, id),
        }
        Ok(())
    }
}

fn dangling_handle(handle: Handle) -> Error {
    Error::InvalidHandle(handle.index())
}

fn not_a_container(handle: Handle) -> Error {
    Error::Other(format!("component at handle {} cannot contain children", handle.index()))
}

fn wrong_kind(component: &Component, expected: Kind) -> Error {
    Error::WrongKind {
        id: component.id().to_string(),
        class: component.class.clone(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::{Element, Relationship, View, ViewObject};
    use crate::model::ids::SequentialGenerator;

    fn model() -> Model {
        let mut model =
            Model::new("m1").with_id_generator(Box::new(SequentialGenerator::new("id")));
        model.create_default_folders().unwrap();
        model
    }

    fn element(model: &mut Model, id: &str) -> Handle {
        let body = ComponentBody::Element(Element {
            name: id.to_uppercase(),
            ..Element::default()
        });
        model.add(Component::new(id, "BusinessActor", body))
    }

    #[test]
    fn test_default_folders() {
        let model = model();
        assert_eq!(model.root_folders().len(), FolderType::ROOTS.len());
        let business = model.root_folder(FolderType::Business).unwrap();
        assert_eq!(model.component(business).unwrap().name(), "Business");
        assert_eq!(
            model.default_folder_for(Kind::Element, "BusinessActor"),
            Some(business)
        );
    }

    #[test]
    fn test_create_default_folders_is_idempotent() {
        let mut model = model();
        model.create_default_folders().unwrap();
        assert_eq!(model.root_folders().len(), FolderType::ROOTS.len());
    }

    #[test]
    fn test_attach_moves_between_folders() {
        let mut model = model();
        let business = model.root_folder(FolderType::Business).unwrap();
        let other = model.root_folder(FolderType::Other).unwrap();
        let e = element(&mut model, "e1");

        model.attach_to_folder(business, e).unwrap();
        model.attach_to_folder(other, e).unwrap();

        let business_folder = model.component(business).unwrap().as_folder().unwrap();
        let other_folder = model.component(other).unwrap().as_folder().unwrap();
        assert!(business_folder.elements.is_empty());
        assert_eq!(other_folder.elements, vec![e]);
        assert_eq!(model.component(e).unwrap().parent, Some(other));
    }

    #[test]
    fn test_bind_relationship_keeps_inverse_links() {
        let mut model = model();
        let a = element(&mut model, "a");
        let b = element(&mut model, "b");
        let rel = model.add(Component::new(
            "r1",
            "FlowRelationship",
            ComponentBody::Relationship(Relationship::default()),
        ));

        model.bind_relationship_end(rel, a, End::Source).unwrap();
        model.bind_relationship_end(rel, a, End::Source).unwrap();
        model.bind_relationship_end(rel, b, End::Target).unwrap();

        let ComponentBody::Element(source) = &model.component(a).unwrap().body else {
            panic!("not an element");
        };
        assert_eq!(source.source_relationships, vec![rel]);

        // rebinding the source moves the inverse link
        model.bind_relationship_end(rel, b, End::Source).unwrap();
        let ComponentBody::Element(source) = &model.component(a).unwrap().body else {
            panic!("not an element");
        };
        assert!(source.source_relationships.is_empty());
        let relationship = model.component(rel).unwrap().as_relationship().unwrap();
        assert_eq!(relationship.source, Ref::Resolved(b));
    }

    #[test]
    fn test_bind_rejects_non_concept_endpoint() {
        let mut model = model();
        let folder = model.root_folder(FolderType::Other).unwrap();
        let rel = model.add(Component::new(
            "r1",
            "FlowRelationship",
            ComponentBody::Relationship(Relationship::default()),
        ));
        let err = model.bind_relationship_end(rel, folder, End::Source).unwrap_err();
        assert!(matches!(err, Error::WrongKind { expected: Kind::Element, .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_dangling_handle_is_invalid_handle() {
        let model = model();
        let err = model.component(Handle(999)).unwrap_err();
        assert!(matches!(err, Error::InvalidHandle(999)));
    }

    #[test]
    fn test_objects_showing_concept_in_nested_containers() {
        let mut model = model();
        let e = element(&mut model, "e1");
        let view = model.add(Component::new(
            "v1",
            "ArchimateDiagramModel",
            ComponentBody::View(View::default()),
        ));
        let group = model.add(Component::new(
            "g1",
            "DiagramModelGroup",
            ComponentBody::ViewObject(ViewObject::default()),
        ));
        let shown = model.add(Component::new(
            "o1",
            "DiagramModelArchimateObject",
            ComponentBody::ViewObject(ViewObject {
                concept: Some(e),
                ..ViewObject::default()
            }),
        ));
        model.attach_to_container(view, group).unwrap();
        model.attach_to_container(group, shown).unwrap();

        assert_eq!(model.objects_showing(view, e), vec![shown]);
        assert_eq!(model.enclosing_view(shown), Some(view));
    }

    #[test]
    fn test_upsert_reuses_registered_component() {
        let mut model = model();
        let (first, created) = model.upsert(Kind::Element, "e1", "Goal");
        assert!(created);
        model.registry_mut().insert(Kind::Element, "e1".to_string(), first);
        let (second, created) = model.upsert(Kind::Element, "e1", "Outcome");
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(model.component(first).unwrap().class, "Outcome");
    }

    #[test]
    fn test_latest_version_imported() {
        let mut model = Model::new("m1").with_version(3);
        model.latest_database_version.version = 7;
        assert!(!model.is_latest_version_imported());
        model.set_import_latest_version(true);
        assert!(model.is_latest_version_imported());

        let mut newest = Model::new("m1").with_version(7);
        newest.latest_database_version.version = 7;
        assert!(newest.is_latest_version_imported());
    }
}
