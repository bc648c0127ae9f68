//! Importing one stored component by identifier.
//!
//! Each `import_*_from_id` reads a single row (version 0 meaning the newest
//! one) and either updates the model component with the same id, or, in
//! copy mode, creates a new component under a fresh id whose versions are
//! all unpersisted. A component that did not exist before is placed in
//! the folder it was last stored in.

use rusqlite::params;
use tracing::debug;

use super::import::ImportConnection;
use super::mapping::{self, required_id, version_record};
use super::policy::VersionSelector;
use crate::error::{Error, Result};
use crate::model::{
    Component, ComponentBody, End, Handle, Kind, Model, VersionSet, ViewConnection,
    ViewObject,
};
use crate::storage::Row;

const OBJECT_CLASS: &str = "DiagramModelArchimateObject";
const CONNECTION_CLASS: &str = "DiagramModelArchimateConnection";

fn not_found(kind: Kind, id: &str, version: i64) -> Error {
    Error::ComponentNotFound {
        kind,
        id: id.to_string(),
        version: (version != 0).then_some(version),
    }
}

impl ImportConnection {
    fn fetch(&self, kind: Kind, columns: &str, id: &str, version: i64) -> Result<Row> {
        let table = self.database().table(kind.table());
        let selector = VersionSelector::requested(version).render(&table, "t.id");
        let sql = format!("SELECT t.id AS id, {columns} FROM {table} t WHERE t.id = ? AND t.version = {selector}");
        self.database()
            .select_one(&sql, params![id])?
            .ok_or_else(|| not_found(kind, id, version))
    }

    /// Find or create the component in place, or mint a copy.
    fn place_row(
        model: &mut Model,
        kind: Kind,
        id: &str,
        class: &str,
        row: &Row,
        must_create_copy: bool,
    ) -> Result<(Handle, bool)> {
        if must_create_copy {
            let mut component = Component::new(model.generate_id(), class, ComponentBody::empty(kind));
            component.version = VersionSet::copy();
            return Ok((model.add(component), true));
        }
        let (handle, created) = model.upsert(kind, id, class);
        model.component_mut(handle)?.version = VersionSet::from_store(version_record(row));
        Ok((handle, created))
    }

    /// Import one folder.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the folder is not stored, or
    /// `UnknownFolder` if a new folder has nowhere to go.
    pub fn import_folder_from_id(
        &mut self,
        model: &mut Model,
        id: &str,
        version: i64,
        must_create_copy: bool,
    ) -> Result<Handle> {
        let columns = mapping::folder_columns(self.database().dialect(), "t");
        let row = self.fetch(Kind::Folder, &columns, id, version)?;
        let (handle, created) = Self::place_row(model, Kind::Folder, id, "Folder", &row, must_create_copy)?;
        if let Some(folder) = model.component_mut(handle)?.as_folder_mut() {
            mapping::apply_folder(folder, &row);
        }
        self.import_properties_from(model, handle, id, row.get_i64("version"))?;
        if created {
            self.relocate_component(model, handle, id)?;
        }
        model.record_checksum_baseline(handle, None)?;
        self.stats_mut().folders.imported += 1;
        debug!(folder = %model.component(handle)?.debug_name(), copy = must_create_copy, "imported folder");
        Ok(handle)
    }

    /// Import one element, optionally showing it in `view` and pulling in
    /// the relationships it shares with elements already in the model.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the element is not stored.
    pub fn import_element_from_id(
        &mut self,
        model: &mut Model,
        view: Option<Handle>,
        id: &str,
        version: i64,
        must_create_copy: bool,
        must_import_relationships: bool,
    ) -> Result<Handle> {
        let columns = mapping::element_columns(self.database().dialect(), "t");
        let row = self.fetch(Kind::Element, &columns, id, version)?;
        let class = row.get_string("class").unwrap_or_default();
        Kind::Element.expect_class(&class)?;

        let (handle, created) = Self::place_row(model, Kind::Element, id, &class, &row, must_create_copy)?;
        if let ComponentBody::Element(element) = &mut model.component_mut(handle)?.body {
            mapping::apply_element(element, &row);
        }
        self.import_properties_from(model, handle, id, row.get_i64("version"))?;
        if created {
            self.relocate_component(model, handle, id)?;
        }
        model.record_checksum_baseline(handle, None)?;
        self.stats_mut().elements.imported += 1;
        debug!(element = %model.component(handle)?.debug_name(), copy = must_create_copy, "imported element");

        if let Some(view) = view {
            if model.objects_showing(view, handle).is_empty() {
                Self::add_diagram_object(model, view, handle)?;
            }
        }
        if must_import_relationships {
            self.import_touching_relationships(model, view, id)?;
        }
        Ok(handle)
    }

    fn add_diagram_object(model: &mut Model, view: Handle, concept: Handle) -> Result<Handle> {
        let object = ViewObject {
            concept: Some(concept),
            ..ViewObject::default()
        };
        let mut component = Component::new(model.generate_id(), OBJECT_CLASS, ComponentBody::ViewObject(object));
        component.version = VersionSet::copy();
        let handle = model.add(component);
        model.attach_to_container(view, handle)?;
        model.count_object(handle, false, Some(view))?;
        Ok(handle)
    }

    /// Relationships stored with `element_id` at one end whose other end is
    /// already in the model.
    fn import_touching_relationships(
        &mut self,
        model: &mut Model,
        view: Option<Handle>,
        element_id: &str,
    ) -> Result<()> {
        let sql = format!(
            "SELECT DISTINCT id, source_id, target_id FROM {} WHERE source_id = ? OR target_id = ?",
            self.database().table("relationships")
        );
        let rows = self.database().select(&sql, params![element_id, element_id])?;
        for row in rows {
            let Some(relationship_id) = row.get_non_empty("id") else {
                continue;
            };
            if model.registry().relationship(&relationship_id).is_some() {
                continue;
            }
            let source = row.get_string("source_id").unwrap_or_default();
            let target = row.get_string("target_id").unwrap_or_default();
            if model.registry().concept(&source).is_some() && model.registry().concept(&target).is_some() {
                self.import_relationship_from_id(model, view, &relationship_id, 0, false)?;
            }
        }
        model.resolve_relationships_sources_and_targets()
    }

    /// Import one relationship. With a view, every pair of objects showing
    /// its source and target gets a connection drawing it.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the relationship is not stored.
    pub fn import_relationship_from_id(
        &mut self,
        model: &mut Model,
        view: Option<Handle>,
        id: &str,
        version: i64,
        must_create_copy: bool,
    ) -> Result<Handle> {
        let columns = mapping::relationship_columns(self.database().dialect(), "t");
        let row = self.fetch(Kind::Relationship, &columns, id, version)?;
        let class = row.get_string("class").unwrap_or_default();
        Kind::Relationship.expect_class(&class)?;

        let (handle, created) =
            Self::place_row(model, Kind::Relationship, id, &class, &row, must_create_copy)?;
        if let ComponentBody::Relationship(relationship) = &mut model.component_mut(handle)?.body {
            mapping::apply_relationship(relationship, &row);
        }
        Self::bind_relationship_ends(model, handle, &row)?;
        self.import_properties_from(model, handle, id, row.get_i64("version"))?;
        if created {
            self.relocate_component(model, handle, id)?;
        }
        model.record_checksum_baseline(handle, None)?;
        self.stats_mut().relationships.imported += 1;
        debug!(relationship = %model.component(handle)?.debug_name(), copy = must_create_copy, "imported relationship");

        if let Some(view) = view {
            Self::add_diagram_connections(model, view, handle)?;
        }
        Ok(handle)
    }

    fn add_diagram_connections(model: &mut Model, view: Handle, relationship: Handle) -> Result<()> {
        let (Some(source), Some(target)) = model
            .component(relationship)?
            .as_relationship()
            .map_or((None, None), |r| (r.source.handle(), r.target.handle()))
        else {
            return Ok(());
        };
        let sources = model.objects_showing(view, source);
        let targets = model.objects_showing(view, target);
        for source_object in &sources {
            for target_object in &targets {
                if model.has_connection(relationship, *source_object, *target_object) {
                    continue;
                }
                let connection = ViewConnection {
                    concept: Some(relationship),
                    ..ViewConnection::default()
                };
                let mut component =
                    Component::new(model.generate_id(), CONNECTION_CLASS, ComponentBody::ViewConnection(connection));
                component.version = VersionSet::copy();
                let handle = model.add(component);
                model.bind_connection_end(handle, *source_object, End::Source)?;
                model.bind_connection_end(handle, *target_object, End::Target)?;
                model.count_object(handle, false, Some(view))?;
            }
        }
        Ok(())
    }

    /// Import one view, and with `must_import_content` its objects and
    /// connections as stored for that view version. A copied view gets
    /// copies of its content under fresh ids.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the view is not stored, or any error
    /// of the content import.
    pub fn import_view_from_id(
        &mut self,
        model: &mut Model,
        id: &str,
        version: i64,
        must_create_copy: bool,
        must_import_content: bool,
    ) -> Result<Handle> {
        let columns = mapping::view_columns(self.database().dialect(), "t");
        let row = self.fetch(Kind::View, &columns, id, version)?;
        let class = row.get_string("class").unwrap_or_default();
        Kind::View.expect_class(&class)?;
        let stored_version = row.get_i64("version");

        let (handle, created) = Self::place_row(model, Kind::View, id, &class, &row, must_create_copy)?;
        if let ComponentBody::View(view) = &mut model.component_mut(handle)?.body {
            mapping::apply_view(view, &row);
        }
        self.import_properties_from(model, handle, id, stored_version)?;
        if created {
            self.relocate_component(model, handle, id)?;
        }

        if must_import_content {
            if must_create_copy {
                let local = model.component(handle)?.id().to_string();
                self.start_copy();
                self.remember_copy(id, &local);
            }
            let content = self.import_view_content(model, handle, id, stored_version);
            self.end_copy();
            content?;
        }

        model.record_checksum_baseline(handle, None)?;
        self.stats_mut().views.imported += 1;
        debug!(view = %model.component(handle)?.debug_name(), copy = must_create_copy, "imported view");
        Ok(handle)
    }

    fn import_view_content(&mut self, model: &mut Model, view: Handle, id: &str, version: i64) -> Result<()> {
        self.prepare_import_views_objects(id, version)?;
        while self.import_views_objects(model, view)? {}
        self.prepare_import_views_connections(id, version)?;
        while self.import_views_connections(model, view)? {}
        model.resolve_connections_sources_and_targets()
    }

    /// Import one view object into the view or object its row names as
    /// container, moving it there if it already sits elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the object is not stored, or
    /// `DanglingReference` if its container is not in the model.
    pub fn import_view_object_from_id(
        &mut self,
        model: &mut Model,
        id: &str,
        version: i64,
        must_create_copy: bool,
    ) -> Result<Handle> {
        let columns = mapping::view_object_columns(self.database().dialect(), "t");
        let row = self.fetch(Kind::ViewObject, &columns, id, version)?;
        let stored_id = required_id(&row, "id", Kind::ViewObject)?;

        let handle = if must_create_copy {
            self.start_copy();
            let copy = self.materialize_view_object(model, &stored_id, &row);
            self.end_copy();
            copy?
        } else {
            self.materialize_view_object(model, &stored_id, &row)?
        };

        let container_id = row.get_string("container_id").unwrap_or_default();
        let container = model
            .registry()
            .view(&container_id)
            .or_else(|| model.registry().view_object(&container_id))
            .ok_or_else(|| Error::DanglingReference {
                kind: Kind::ViewObject,
                component: id.to_string(),
                reference: container_id.clone(),
            })?;
        if model.component(handle)?.parent != Some(container) {
            model.attach_to_container(container, handle)?;
        }

        if row.get_non_empty("element_id").is_none() {
            self.import_properties_from(model, handle, id, row.get_i64("version"))?;
        }
        let view = model.enclosing_view(handle);
        if let Some(view) = view {
            let record = &mut model.component_mut(view)?.version.current;
            record.container_checksum = None;
        }
        model.record_checksum_baseline(handle, view)?;
        self.stats_mut().view_objects.imported += 1;
        debug!(object = %model.component(handle)?.debug_name(), copy = must_create_copy, "imported view object");
        Ok(handle)
    }

    /// Import one view connection. A relationship it draws that is not in
    /// the model yet is imported first.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the connection is not stored.
    pub fn import_view_connection_from_id(
        &mut self,
        model: &mut Model,
        id: &str,
        version: i64,
        must_create_copy: bool,
    ) -> Result<Handle> {
        let columns = mapping::view_connection_columns(self.database().dialect(), "t");
        let row = self.fetch(Kind::ViewConnection, &columns, id, version)?;
        let stored_id = required_id(&row, "id", Kind::ViewConnection)?;

        if let Some(relationship_id) = row.get_non_empty("relationship_id") {
            if model.registry().relationship(&relationship_id).is_none() {
                self.import_relationship_from_id(model, None, &relationship_id, 0, false)?;
            }
        }

        let handle = if must_create_copy {
            self.start_copy();
            let copy = self.materialize_view_connection(model, &stored_id, &row);
            self.end_copy();
            copy?
        } else {
            self.materialize_view_connection(model, &stored_id, &row)?
        };
        model.resolve_connections_sources_and_targets()?;

        let view = connection_end(model, handle, End::Source).and_then(|source| model.enclosing_view(source));
        model.record_checksum_baseline(handle, view)?;
        self.stats_mut().view_connections.imported += 1;
        debug!(connection = %model.component(handle)?.debug_name(), copy = must_create_copy, "imported view connection");
        Ok(handle)
    }
}

fn connection_end(model: &Model, connection: Handle, end: End) -> Option<Handle> {
    let connection = model.get(connection)?.as_view_connection()?;
    match end {
        End::Source => connection.source.handle(),
        End::Target => connection.target.handle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FolderType, Ref};
    use crate::sync::archive::MemoryArchive;
    use crate::sync::fixture::seeded;

    fn empty_model() -> Model {
        let mut model = Model::new("m1");
        model.create_default_folders().unwrap();
        model
    }

    fn full_model(connection: &mut ImportConnection) -> Model {
        let mut model = Model::new("m1").with_version(1);
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();
        model
    }

    #[test]
    fn test_import_element_falls_back_to_default_folder() {
        let mut connection = seeded();
        let mut model = empty_model();

        let e1 = connection
            .import_element_from_id(&mut model, None, "e1", 1, false, false)
            .unwrap();

        let component = model.component(e1).unwrap();
        assert_eq!(component.name(), "Customer");
        assert_eq!(component.version.initial.version, 1);
        assert_eq!(component.properties.len(), 2);
        assert_eq!(component.parent, model.root_folder(FolderType::Business));
        assert_eq!(model.registry().element("e1"), Some(e1));
    }

    #[test]
    fn test_import_element_into_last_known_folder() {
        let mut connection = seeded();
        let mut model = empty_model();

        let sub = connection
            .import_folder_from_id(&mut model, "f-sub", 0, false)
            .unwrap();
        assert_eq!(model.component(sub).unwrap().parent, model.root_folder(FolderType::Business));

        let e1 = connection
            .import_element_from_id(&mut model, None, "e1", 0, false, false)
            .unwrap();
        let component = model.component(e1).unwrap();
        assert_eq!(component.name(), "Client");
        assert_eq!(component.version.initial.version, 2);
        assert_eq!(component.version.initial.checksum.as_deref(), Some("ce1b"));
        assert_eq!(component.parent, Some(sub));
    }

    #[test]
    fn test_single_import_records_baseline() {
        let mut connection = seeded();
        let mut model = empty_model();

        let e1 = connection
            .import_element_from_id(&mut model, None, "e1", 0, false, false)
            .unwrap();
        let version = &model.component(e1).unwrap().version;
        assert!(version.baseline.is_some());
        assert_eq!(version.baseline, version.current.checksum);

        let copy = connection
            .import_element_from_id(&mut model, None, "e1", 0, true, false)
            .unwrap();
        assert!(model.component(copy).unwrap().version.baseline.is_none());
    }

    #[test]
    fn test_import_subfolder_stored_with_root_type() {
        let mut connection = seeded();
        connection
            .database()
            .execute("UPDATE folders SET type = 1 WHERE id = 'f-sub'", &[])
            .unwrap();
        let mut model = empty_model();

        let sub = connection
            .import_folder_from_id(&mut model, "f-sub", 0, false)
            .unwrap();
        let folder = model.component(sub).unwrap().as_folder().unwrap();
        assert_eq!(folder.folder_type, FolderType::User);
        assert_eq!(model.component(sub).unwrap().parent, model.root_folder(FolderType::Business));
        assert!(!model.root_folders().contains(&sub));
    }

    #[test]
    fn test_import_element_pulls_relationships() {
        let mut connection = seeded();
        let mut model = empty_model();

        let e1 = connection
            .import_element_from_id(&mut model, None, "e1", 0, false, false)
            .unwrap();
        assert!(model.registry().relationship("r1").is_none());

        connection
            .import_element_from_id(&mut model, None, "e2", 0, false, true)
            .unwrap();
        let r1 = model.registry().relationship("r1").unwrap();
        let relationship = model.component(r1).unwrap().as_relationship().unwrap();
        assert_eq!(relationship.source, Ref::Resolved(e1));
        assert_eq!(model.component(r1).unwrap().parent, model.root_folder(FolderType::Relations));
    }

    #[test]
    fn test_import_elements_into_view_draws_objects_and_connections() {
        let mut connection = seeded();
        let mut model = empty_model();

        let view = connection
            .import_view_from_id(&mut model, "v1", 0, false, false)
            .unwrap();
        assert!(model.component(view).unwrap().children().is_empty());

        connection
            .import_element_from_id(&mut model, Some(view), "e1", 0, false, false)
            .unwrap();
        connection
            .import_element_from_id(&mut model, Some(view), "e2", 0, false, true)
            .unwrap();

        assert_eq!(model.component(view).unwrap().children().len(), 2);
        let connections = model.registry().all(Kind::ViewConnection);
        assert_eq!(connections.len(), 1);
        let drawn = model
            .component(connections[0])
            .unwrap()
            .as_view_connection()
            .unwrap();
        assert_eq!(drawn.concept, model.registry().relationship("r1"));
        assert!(model.component(connections[0]).unwrap().version.is_new());
    }

    #[test]
    fn test_copy_element() {
        let mut connection = seeded();
        let mut model = empty_model();

        let copy = connection
            .import_element_from_id(&mut model, None, "e1", 1, true, false)
            .unwrap();

        let component = model.component(copy).unwrap();
        assert_ne!(component.id(), "e1");
        assert_eq!(component.name(), "Customer");
        assert!(component.version.is_new());
        assert_eq!(component.properties.len(), 2);
        assert!(model.registry().element("e1").is_none());
    }

    #[test]
    fn test_import_view_with_content() {
        let mut connection = seeded();
        let mut model = empty_model();

        let view = connection
            .import_view_from_id(&mut model, "v1", 0, false, true)
            .unwrap();

        assert_eq!(model.component(view).unwrap().parent, model.root_folder(FolderType::Diagrams));
        assert_eq!(model.component(view).unwrap().children().len(), 3);
        assert!(model.registry().element("e1").is_some());
        assert!(model.registry().element("e2").is_some());
        let c1 = model.registry().view_connection("c1").unwrap();
        assert_eq!(
            model.component(c1).unwrap().as_view_connection().unwrap().concept,
            model.registry().relationship("r1")
        );
        assert_eq!(connection.image_paths().collect::<Vec<_>>(), vec!["images/logo.png"]);
    }

    #[test]
    fn test_copy_view_with_content() {
        let mut connection = seeded();
        let mut model = full_model(&mut connection);
        let original = model.registry().view("v1").unwrap();

        let copy = connection
            .import_view_from_id(&mut model, "v1", 0, true, true)
            .unwrap();

        assert_ne!(copy, original);
        let component = model.component(copy).unwrap();
        assert_eq!(component.name(), "Overview");
        assert!(component.version.is_new());
        assert_eq!(component.parent, model.registry().folder("f-dia"));
        assert_eq!(component.children().len(), 3);
        assert_eq!(model.component(original).unwrap().children().len(), 3);

        // copied content shows the same concepts under fresh ids
        assert_eq!(model.registry().all(Kind::View).len(), 2);
        assert_eq!(model.registry().all(Kind::ViewObject).len(), 8);
        assert_eq!(model.registry().all(Kind::ViewConnection).len(), 2);
        let e1 = model.registry().element("e1");
        assert_eq!(model.objects_showing(copy, e1.unwrap()).len(), 1);
    }

    #[test]
    fn test_import_view_object_into_its_container() {
        let mut connection = seeded();
        let mut model = full_model(&mut connection);
        let group = model.registry().view_object("o3").unwrap();
        let note = model.registry().view_object("o4").unwrap();

        let again = connection
            .import_view_object_from_id(&mut model, "o4", 0, false)
            .unwrap();
        assert_eq!(again, note);

        let copy = connection
            .import_view_object_from_id(&mut model, "o4", 0, true)
            .unwrap();
        assert_ne!(copy, note);
        assert_eq!(model.component(copy).unwrap().parent, Some(group));
        assert!(model.component(copy).unwrap().version.is_new());

        let view = model.registry().view("v1").unwrap();
        assert!(model.component(view).unwrap().version.current.container_checksum.is_none());
    }

    #[test]
    fn test_copy_view_connection() {
        let mut connection = seeded();
        let mut model = full_model(&mut connection);

        let copy = connection
            .import_view_connection_from_id(&mut model, "c1", 0, true)
            .unwrap();

        let o1 = model.registry().view_object("o1").unwrap();
        assert_eq!(connection_end(&model, copy, End::Source), Some(o1));
        assert_eq!(model.registry().all(Kind::ViewConnection).len(), 2);
        let body = model.component(copy).unwrap().as_view_connection().unwrap();
        assert_eq!(body.bendpoints.len(), 1);
    }

    #[test]
    fn test_not_found() {
        let mut connection = seeded();
        let mut model = empty_model();
        assert!(matches!(
            connection.import_element_from_id(&mut model, None, "zz", 0, false, false),
            Err(Error::ComponentNotFound { version: None, .. })
        ));
        assert!(matches!(
            connection.import_folder_from_id(&mut model, "f-bus", 9, false),
            Err(Error::ComponentNotFound { version: Some(9), .. })
        ));
    }
}
