//! Registry of the components of a model.
//!
//! Six insertion-ordered maps index every counted component by
//! identifier, and four tables hold relationship and connection
//! endpoints that could not be bound when their owner was imported.
//! Resolution runs once a whole category has been streamed.

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::archimate::{End, Model};
use super::component::{Component, ComponentBody, Handle};
use super::kind::{FolderType, Kind};
use crate::error::{Error, Result};
use crate::sync::hash::{component_checksum, hash_str};

#[derive(Debug, Default)]
pub struct Registry {
    elements: IndexMap<String, Handle>,
    relationships: IndexMap<String, Handle>,
    folders: IndexMap<String, Handle>,
    views: IndexMap<String, Handle>,
    view_objects: IndexMap<String, Handle>,
    view_connections: IndexMap<String, Handle>,

    relationship_sources: IndexMap<Handle, String>,
    relationship_targets: IndexMap<Handle, String>,
    connection_sources: IndexMap<Handle, String>,
    connection_targets: IndexMap<Handle, String>,
}

impl Registry {
    /// Components of one kind, in registration order.
    #[must_use]
    pub const fn all(&self, kind: Kind) -> &IndexMap<String, Handle> {
        match kind {
            Kind::Element => &self.elements,
            Kind::Relationship => &self.relationships,
            Kind::Folder => &self.folders,
            Kind::View => &self.views,
            Kind::ViewObject => &self.view_objects,
            Kind::ViewConnection => &self.view_connections,
        }
    }

    fn all_mut(&mut self, kind: Kind) -> &mut IndexMap<String, Handle> {
        match kind {
            Kind::Element => &mut self.elements,
            Kind::Relationship => &mut self.relationships,
            Kind::Folder => &mut self.folders,
            Kind::View => &mut self.views,
            Kind::ViewObject => &mut self.view_objects,
            Kind::ViewConnection => &mut self.view_connections,
        }
    }

    #[must_use]
    pub fn get(&self, kind: Kind, id: &str) -> Option<Handle> {
        self.all(kind).get(id).copied()
    }

    /// Register a component. Registering an id again keeps its position.
    pub fn insert(&mut self, kind: Kind, id: String, handle: Handle) {
        self.all_mut(kind).insert(id, handle);
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<Handle> {
        self.elements.get(id).copied()
    }

    #[must_use]
    pub fn relationship(&self, id: &str) -> Option<Handle> {
        self.relationships.get(id).copied()
    }

    #[must_use]
    pub fn folder(&self, id: &str) -> Option<Handle> {
        self.folders.get(id).copied()
    }

    #[must_use]
    pub fn view(&self, id: &str) -> Option<Handle> {
        self.views.get(id).copied()
    }

    #[must_use]
    pub fn view_object(&self, id: &str) -> Option<Handle> {
        self.view_objects.get(id).copied()
    }

    #[must_use]
    pub fn view_connection(&self, id: &str) -> Option<Handle> {
        self.view_connections.get(id).copied()
    }

    /// An element, or failing that a relationship.
    #[must_use]
    pub fn concept(&self, id: &str) -> Option<Handle> {
        self.element(id).or_else(|| self.relationship(id))
    }

    /// A view object, or failing that a view connection.
    #[must_use]
    pub fn connectable(&self, id: &str) -> Option<Handle> {
        self.view_object(id).or_else(|| self.view_connection(id))
    }

    /// Number of registered components across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        Kind::ALL.iter().map(|kind| self.all(*kind).len()).sum()
    }

    // ── Deferred references ───────────────────────────────────

    /// Record that `relationship`'s source is `id`. An empty id is ignored
    /// and a second registration replaces the first.
    pub fn register_source_relationship(&mut self, relationship: Handle, id: &str) {
        register(&mut self.relationship_sources, relationship, id);
    }

    pub fn register_target_relationship(&mut self, relationship: Handle, id: &str) {
        register(&mut self.relationship_targets, relationship, id);
    }

    /// Record that `connection`'s source is `id` (possibly a comma
    /// separated list).
    pub fn register_source_connection(&mut self, connection: Handle, id: &str) {
        register(&mut self.connection_sources, connection, id);
    }

    pub fn register_target_connection(&mut self, connection: Handle, id: &str) {
        register(&mut self.connection_targets, connection, id);
    }

    #[must_use]
    pub const fn pending_relationship_sources(&self) -> &IndexMap<Handle, String> {
        &self.relationship_sources
    }

    #[must_use]
    pub const fn pending_relationship_targets(&self) -> &IndexMap<Handle, String> {
        &self.relationship_targets
    }

    #[must_use]
    pub const fn pending_connection_sources(&self) -> &IndexMap<Handle, String> {
        &self.connection_sources
    }

    #[must_use]
    pub const fn pending_connection_targets(&self) -> &IndexMap<Handle, String> {
        &self.connection_targets
    }

    fn clear_components(&mut self) {
        for kind in Kind::ALL {
            self.all_mut(kind).clear();
        }
    }

    fn clear_views(&mut self) {
        self.views.clear();
        self.view_objects.clear();
        self.view_connections.clear();
    }

    fn clear_pending(&mut self) {
        self.relationship_sources.clear();
        self.relationship_targets.clear();
        self.connection_sources.clear();
        self.connection_targets.clear();
    }
}

fn register(table: &mut IndexMap<Handle, String>, owner: Handle, id: &str) {
    if !id.is_empty() {
        table.insert(owner, id.to_string());
    }
}

fn split_ids(ids: &str) -> impl Iterator<Item = &str> {
    ids.split(',').map(str::trim).filter(|id| !id.is_empty())
}

// ── Counting and resolution ───────────────────────────────────

impl Model {
    /// Forget every registered component and pending reference.
    ///
    /// Components stay in the arena; only the indexes are cleared.
    pub fn reset_counters(&mut self) {
        self.registry.clear_components();
        self.registry.clear_pending();
    }

    /// Forget the pending endpoint tables only.
    pub fn reset_source_and_target_counters(&mut self) {
        self.registry.clear_pending();
    }

    /// Register `handle` and everything it contains.
    ///
    /// Views recurse into their objects, view objects into their children
    /// and attached connections, and folders into their subfolders and
    /// content (setting each subfolder's `root_type`). When
    /// `compute_checksum` is set the component's checksum is computed,
    /// extended with the checksums of its view content, stored as its
    /// current version checksum and returned.
    pub fn count_object(
        &mut self,
        handle: Handle,
        compute_checksum: bool,
        parent_view: Option<Handle>,
    ) -> Result<Option<String>> {
        let mut builder = if compute_checksum {
            Some(component_checksum(self, handle)?)
        } else {
            None
        };
        let own_len = builder.as_ref().map_or(0, String::len);

        let component = self.component(handle)?;
        let kind = component.kind();
        let id = component.id().to_string();
        self.registry.insert(kind, id, handle);

        let child_view = if kind == Kind::View {
            Some(handle)
        } else {
            parent_view
        };

        match kind {
            Kind::Element | Kind::Relationship => {}
            Kind::View | Kind::ViewObject => {
                let nested = self.view_content(handle, parent_view)?;
                for child in nested {
                    let sum = self.count_object(child, compute_checksum, child_view)?;
                    if let (Some(builder), Some(sum)) = (builder.as_mut(), sum) {
                        builder.push_str(&sum);
                    }
                }
            }
            Kind::ViewConnection => {
                let attached = self.attached_connections(handle, parent_view)?;
                for connection in attached {
                    if self.registry.view_connection(self.component(connection)?.id()).is_none() {
                        self.count_object(connection, compute_checksum, parent_view)?;
                    }
                }
            }
            Kind::Folder => {
                // Folder content never contributes to the folder checksum.
                let (root_type, folders, elements) = {
                    let folder = self
                        .component(handle)?
                        .as_folder()
                        .ok_or_else(|| wrong_body(handle))?;
                    (folder.root_type, folder.folders.clone(), folder.elements.clone())
                };
                for sub in folders {
                    if let Some(subfolder) = self.component_mut(sub)?.as_folder_mut() {
                        subfolder.root_type = if subfolder.folder_type == FolderType::User {
                            root_type
                        } else {
                            subfolder.folder_type
                        };
                    }
                    self.count_object(sub, compute_checksum, None)?;
                }
                for child in elements {
                    self.count_object(child, compute_checksum, None)?;
                }
            }
        }

        let Some(mut checksum) = builder else {
            return Ok(None);
        };
        let appended = checksum.len() != own_len;
        let container_checksum = if appended && kind == Kind::View {
            Some(hash_str(&checksum[own_len..]))
        } else {
            None
        };
        if appended {
            checksum = hash_str(&checksum);
        }

        let component = self.component_mut(handle)?;
        component.version.current.checksum = Some(checksum.clone());
        if kind == Kind::View {
            component.version.current.container_checksum = container_checksum;
        }
        trace!(component = %component.debug_name(), checksum = %checksum, "counted");
        Ok(Some(checksum))
    }

    /// Children, then source connections, then target connections of a view
    /// or view object. Records the enclosing view on view objects.
    fn view_content(&mut self, handle: Handle, parent_view: Option<Handle>) -> Result<Vec<Handle>> {
        match &mut self.component_mut(handle)?.body {
            ComponentBody::View(view) => Ok(view.children.clone()),
            ComponentBody::ViewObject(object) => {
                if parent_view.is_some() {
                    object.view = parent_view;
                }
                Ok(object
                    .children
                    .iter()
                    .chain(&object.source_connections)
                    .chain(&object.target_connections)
                    .copied()
                    .collect())
            }
            _ => Err(wrong_body(handle)),
        }
    }

    /// Connections attached to a connection. Records the enclosing view.
    fn attached_connections(
        &mut self,
        handle: Handle,
        parent_view: Option<Handle>,
    ) -> Result<Vec<Handle>> {
        match &mut self.component_mut(handle)?.body {
            ComponentBody::ViewConnection(connection) => {
                if parent_view.is_some() {
                    connection.view = parent_view;
                }
                Ok(connection
                    .source_connections
                    .iter()
                    .chain(&connection.target_connections)
                    .copied()
                    .collect())
            }
            _ => Err(wrong_body(handle)),
        }
    }

    /// Re-register the whole model from its root folders, computing every
    /// checksum. Returns the number of registered components.
    pub fn count_all_objects(&mut self) -> Result<usize> {
        let total = self.count_tree(true)?;
        debug!(model = %self.id, total, "counted all objects");
        Ok(total)
    }

    /// Re-register the whole model from its root folders without computing
    /// checksums, so that components already in the tree are found again
    /// by identifier.
    pub fn reindex(&mut self) -> Result<usize> {
        let total = self.count_tree(false)?;
        trace!(model = %self.id, total, "reindexed model");
        Ok(total)
    }

    fn count_tree(&mut self, compute_checksum: bool) -> Result<usize> {
        self.reset_counters();

        let roots = self.root_folders().to_vec();
        for &root in &roots {
            let component = self.component_mut(root)?;
            if let Some(folder) = component.as_folder_mut() {
                folder.root_type = folder.folder_type;
            }
            let id = component.id().to_string();
            self.registry.insert(Kind::Folder, id, root);
        }
        for root in roots {
            self.count_object(root, compute_checksum, None)?;
        }
        Ok(self.registry.total())
    }

    /// Record the current checksum of every stored component of the tree
    /// that has no baseline yet. Returns the number of baselines recorded.
    pub fn record_checksum_baselines(&mut self) -> Result<usize> {
        self.count_all_objects()?;
        let handles: Vec<Handle> = Kind::ALL
            .iter()
            .flat_map(|kind| self.registry.all(*kind).values().copied())
            .collect();
        let mut recorded = 0;
        for handle in handles {
            let version = &mut self.component_mut(handle)?.version;
            if version.is_new() || version.baseline.is_some() {
                continue;
            }
            version.baseline.clone_from(&version.current.checksum);
            recorded += 1;
        }
        trace!(model = %self.id, recorded, "recorded checksum baselines");
        Ok(recorded)
    }

    /// Count `handle` with checksums and record the baseline of it and, for
    /// views and view objects, of everything they contain.
    pub fn record_checksum_baseline(&mut self, handle: Handle, parent_view: Option<Handle>) -> Result<()> {
        self.count_object(handle, true, parent_view)?;
        let mut pending = vec![handle];
        while let Some(current) = pending.pop() {
            let component = self.component_mut(current)?;
            let kind = component.kind();
            if !component.version.is_new() {
                component.version.baseline.clone_from(&component.version.current.checksum);
            }
            if matches!(kind, Kind::View | Kind::ViewObject) {
                pending.extend(self.view_content(current, None)?);
            }
        }
        Ok(())
    }

    /// Recompute the checksums of every view under the diagrams folder.
    pub fn reset_views_checksums(&mut self) -> Result<()> {
        self.registry.clear_views();
        let Some(diagrams) = self.root_folder(FolderType::Diagrams) else {
            return Ok(());
        };

        let mut views = Vec::new();
        let mut pending = vec![diagrams];
        while let Some(folder) = pending.pop() {
            if let Some(content) = self.component(folder)?.as_folder() {
                pending.extend(content.folders.iter().rev());
                views.extend(content.elements.iter().copied().filter(|h| {
                    self.get(*h).is_some_and(|c| c.kind() == Kind::View)
                }));
            }
        }
        for view in views {
            self.count_object(view, true, None)?;
        }
        Ok(())
    }

    /// Bind every pending relationship endpoint, then clear the tables.
    ///
    /// Endpoints are looked up among elements first, then relationships.
    /// Any identifier that cannot be found is a dangling reference; the
    /// tables are then left as they were.
    pub fn resolve_relationships_sources_and_targets(&mut self) -> Result<()> {
        let sources = self.registry.relationship_sources.clone();
        let targets = self.registry.relationship_targets.clone();
        debug!(
            sources = sources.len(),
            targets = targets.len(),
            "resolving relationships"
        );

        for (end, table) in [(End::Source, sources), (End::Target, targets)] {
            for (relationship, ids) in table {
                for id in split_ids(&ids) {
                    let endpoint = self
                        .registry
                        .concept(id)
                        .ok_or_else(|| dangling(self.get(relationship), Kind::Relationship, id))?;
                    self.bind_relationship_end(relationship, endpoint, end)?;
                }
            }
        }
        self.registry.relationship_sources.clear();
        self.registry.relationship_targets.clear();
        Ok(())
    }

    /// Bind every pending view connection endpoint, then clear the tables.
    ///
    /// Endpoints are looked up among view objects first, then
    /// connections. In a comma separated list every listed endpoint must
    /// exist and the connection ends on the last one. On a dangling
    /// reference the tables are left as they were.
    pub fn resolve_connections_sources_and_targets(&mut self) -> Result<()> {
        let sources = self.registry.connection_sources.clone();
        let targets = self.registry.connection_targets.clone();
        debug!(
            sources = sources.len(),
            targets = targets.len(),
            "resolving connections"
        );

        for (end, table) in [(End::Source, sources), (End::Target, targets)] {
            for (connection, ids) in table {
                for id in split_ids(&ids) {
                    let endpoint = self
                        .registry
                        .connectable(id)
                        .ok_or_else(|| dangling(self.get(connection), Kind::ViewConnection, id))?;
                    self.bind_connection_end(connection, endpoint, end)?;
                }
            }
        }
        self.registry.connection_sources.clear();
        self.registry.connection_targets.clear();
        Ok(())
    }
}

fn wrong_body(handle: Handle) -> Error {
    Error::Other(format!("component at handle {} has a body of another kind", handle.index()))
}

fn dangling(owner: Option<&Component>, kind: Kind, reference: &str) -> Error {
    Error::DanglingReference {
        kind,
        component: owner.map_or_else(String::new, |c| c.id().to_string()),
        reference: reference.to_string(),
    }
}
