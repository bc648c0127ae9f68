//! Streaming import of a stored model into a [`Model`].
//!
//! An `ImportConnection` owns a [`Database`] handle and at most one open
//! result stream. The caller drives the import one category at a time:
//!
//! 1. [`ImportConnection::import_model`] loads the model row and announces
//!    how many rows of each category will follow.
//! 2. For each category, a `prepare_import_*` call opens the stream and
//!    the matching `import_*` step materializes one row per call,
//!    returning `false` once the stream is exhausted.
//! 3. Pending references are resolved through the model, components are
//!    relocated to their last known folders, and the counts are checked.
//!
//! [`ImportConnection::import_full_model`] runs all of the above in order.

use std::collections::HashMap;

use indexmap::IndexSet;
use rusqlite::params;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::archive::ArchiveManager;
use super::mapping::{self, required_id, version_record};
use super::policy::VersionSelector;
use super::types::{Category, CursorState, CursorStates, ImportStats, ModelSummary};
use crate::error::{Error, Result};
use crate::model::{
    Bendpoint, Component, ComponentBody, End, FolderType, Handle, Kind, Model, Property,
    VersionSet,
};
use crate::storage::{Cursor, Database, Row};

/// Requests built by `import_model`, one per model-level category.
#[derive(Debug, Default)]
struct Requests {
    folders: Option<String>,
    elements: Option<String>,
    relationships: Option<String>,
    views: Option<String>,
}

/// A stored row with its attached data, as returned by `get_object`.
#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub kind: Kind,
    pub row: serde_json::Value,
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bendpoints: Vec<Bendpoint>,
}

#[derive(Debug)]
pub struct ImportConnection {
    db: Database,
    cursor: Option<Cursor>,
    active: Option<Category>,
    states: CursorStates,
    stats: ImportStats,
    requests: Requests,
    image_paths: IndexSet<String>,
    /// Stored id to new id, while the content of a copied view is imported.
    copy_ids: Option<HashMap<String, String>>,
}

impl ImportConnection {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db,
            cursor: None,
            active: None,
            states: CursorStates::default(),
            stats: ImportStats::default(),
            requests: Requests::default(),
            image_paths: IndexSet::new(),
            copy_ids: None,
        }
    }

    /// A second import connection sharing this one's store handle.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self::new(self.db.duplicate())
    }

    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    #[must_use]
    pub const fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ImportStats {
        &mut self.stats
    }

    #[must_use]
    pub const fn state(&self, category: Category) -> CursorState {
        self.states.get(category)
    }

    /// Image paths referenced by the view objects imported so far.
    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.image_paths.iter().map(String::as_str)
    }

    /// Close the open stream, zero the counters and forget collected image
    /// paths.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.active = None;
        self.states = CursorStates::default();
        self.stats = ImportStats::default();
        self.image_paths.clear();
        self.copy_ids = None;
    }

    /// Reset and close the store connection, unless it is shared.
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection refuses to close.
    pub fn close(mut self) -> Result<()> {
        self.reset();
        self.db.close()
    }

    // ── Streams ───────────────────────────────────────────────

    fn open_cursor(&mut self, category: Category, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<()> {
        if let Some(previous) = self.active.take() {
            if previous != category {
                trace!(category = %previous, "closing unfinished stream");
                self.states.set(previous, CursorState::Exhausted);
            }
        }
        let cursor = self.db.select(sql, params)?;
        trace!(category = %category, rows = cursor.remaining(), "stream prepared");
        self.cursor = Some(cursor);
        self.active = Some(category);
        self.states.set(category, CursorState::Prepared);
        Ok(())
    }

    fn next_row(&mut self, category: Category) -> Option<Row> {
        if self.active != Some(category) {
            return None;
        }
        if let Some(row) = self.cursor.as_mut().and_then(Iterator::next) {
            self.states.set(category, CursorState::Streaming);
            return Some(row);
        }
        self.cursor = None;
        self.active = None;
        self.states.set(category, CursorState::Exhausted);
        None
    }

    fn request(&self, category: Category) -> Result<&str> {
        let request = match category {
            Category::Folders => self.requests.folders.as_deref(),
            Category::Elements => self.requests.elements.as_deref(),
            Category::Relationships => self.requests.relationships.as_deref(),
            Category::Views => self.requests.views.as_deref(),
            _ => None,
        };
        request.ok_or_else(|| {
            Error::InvalidArgument(format!("no {category} request: import the model first"))
        })
    }

    // ── Model ─────────────────────────────────────────────────

    /// Load the model row and prepare the request of every category.
    ///
    /// Version 0 selects the newest stored model version. Components
    /// already in the model tree are registered again, so importing into a
    /// populated model updates them in place. Returns the number of
    /// components the full import will materialize.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` if the model (or the requested version) is
    /// not in the store, or a database error.
    pub fn import_model(&mut self, model: &mut Model) -> Result<usize> {
        self.reset();
        model.reset_counters();
        model.reindex()?;

        let models = self.db.table("models");
        if model.initial_version.version == 0 {
            let newest = self.db.query_i64(
                &format!("SELECT MAX(version) FROM {models} WHERE id = ?"),
                params![model.id],
            )?;
            model.initial_version.version = newest.ok_or_else(|| Error::ModelNotFound {
                id: model.id.clone(),
                version: None,
            })?;
        }

        let row = self
            .db
            .select_one(
                &format!(
                    "SELECT name, purpose, checksum, created_on FROM {models} WHERE id = ? AND version = ?"
                ),
                params![model.id, model.initial_version.version],
            )?
            .ok_or_else(|| Error::ModelNotFound {
                id: model.id.clone(),
                version: Some(model.initial_version.version),
            })?;
        model.name = row.get_string("name").unwrap_or_default();
        model.purpose = row.get_string("purpose");
        model.initial_version.checksum = row.get_string("checksum");
        model.initial_version.timestamp = row.get_timestamp("created_on");
        model.current_version = model.initial_version.clone();
        model.latest_database_version.version = self.get_latest_model_version(&model.id)?;

        self.import_model_properties(model)?;
        self.import_metadata(model)?;

        self.requests = self.build_requests(model);
        let (model_id, model_version) = (model.id.clone(), model.initial_version.version);
        let scope: [&dyn rusqlite::ToSql; 2] = [&model_id, &model_version];
        for category in [
            Category::Folders,
            Category::Elements,
            Category::Relationships,
            Category::Views,
        ] {
            let count = self.db.count(self.request(category)?, &scope)?;
            self.stats.get_mut(category).expected = count;
        }
        let (objects, connections, images) = self.view_content_requests(model);
        self.stats.view_objects.expected = self.db.count(&objects, &scope)?;
        self.stats.view_connections.expected = self.db.count(&connections, &scope)?;
        self.stats.images.expected = self.db.count(&images, &scope)?;

        info!(
            model = %model.id,
            version = model.initial_version.version,
            latest = model.latest_database_version.version,
            components = self.stats.total_expected(),
            images = self.stats.images.expected,
            "importing model"
        );
        Ok(self.stats.total_expected())
    }

    fn build_requests(&self, model: &Model) -> Requests {
        let dialect = self.db.dialect();
        let join = |association: &str, alias: &str, id_column: &str, version_column: &str, table: &str, columns: String| {
            let association_table = self.db.table(association);
            let component_table = self.db.table(table);
            let pinned = format!("{alias}.{version_column}");
            let selector = VersionSelector::for_model(model, &pinned)
                .render(&component_table, &format!("{alias}.{id_column}"));
            format!(
                "SELECT {alias}.{id_column} AS id, {alias}.parent_folder_id AS parent_folder_id, {columns} \
                 FROM {association_table} {alias} \
                 JOIN {component_table} c ON c.id = {alias}.{id_column} AND c.version = {selector} \
                 WHERE {alias}.model_id = ? AND {alias}.model_version = ?"
            )
        };
        Requests {
            folders: Some(join(
                "folders_in_model",
                "fim",
                "folder_id",
                "folder_version",
                "folders",
                mapping::folder_columns(dialect, "c"),
            )),
            elements: Some(join(
                "elements_in_model",
                "eim",
                "element_id",
                "element_version",
                "elements",
                mapping::element_columns(dialect, "c"),
            )),
            relationships: Some(join(
                "relationships_in_model",
                "rim",
                "relationship_id",
                "relationship_version",
                "relationships",
                mapping::relationship_columns(dialect, "c"),
            )),
            views: Some(join(
                "views_in_model",
                "vim",
                "view_id",
                "view_version",
                "views",
                mapping::view_columns(dialect, "c"),
            )),
        }
    }

    /// Count requests for view objects, view connections and distinct
    /// images across every view of the model.
    fn view_content_requests(&self, model: &Model) -> (String, String, String) {
        let views_in_model = self.db.table("views_in_model");
        let selector = VersionSelector::for_model(model, "vim.view_version")
            .render(&self.db.table("views"), "vim.view_id");
        let objects_in_view = self.db.table("views_objects_in_view");
        let connections_in_view = self.db.table("views_connections_in_view");
        let objects = self.db.table("views_objects");

        let scope = "WHERE vim.model_id = ? AND vim.model_version = ?";
        (
            format!(
                "SELECT oiv.object_id FROM {views_in_model} vim \
                 JOIN {objects_in_view} oiv ON oiv.view_id = vim.view_id AND oiv.view_version = {selector} {scope}"
            ),
            format!(
                "SELECT civ.connection_id FROM {views_in_model} vim \
                 JOIN {connections_in_view} civ ON civ.view_id = vim.view_id AND civ.view_version = {selector} {scope}"
            ),
            format!(
                "SELECT DISTINCT o.image_path FROM {views_in_model} vim \
                 JOIN {objects_in_view} oiv ON oiv.view_id = vim.view_id AND oiv.view_version = {selector} \
                 JOIN {objects} o ON o.id = oiv.object_id AND o.version = oiv.object_version \
                 {scope} AND o.image_path IS NOT NULL"
            ),
        )
    }

    /// Newest stored version of a model, 0 if it was never stored.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn get_latest_model_version(&self, model_id: &str) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX(version), 0) FROM {} WHERE id = ?",
            self.db.table("models")
        );
        Ok(self.db.query_i64(&sql, params![model_id])?.unwrap_or_default())
    }

    /// Every stored model version, optionally filtered by a
    /// case-insensitive name pattern (`%` wildcards).
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list_models(&self, name_filter: Option<&str>) -> Result<Vec<ModelSummary>> {
        let models = self.db.table("models");
        let cursor = match name_filter {
            Some(pattern) => self.db.select(
                &format!(
                    "SELECT id, version, name, created_on, checksum FROM {models} WHERE {} ORDER BY id, version",
                    self.db.dialect().like_insensitive("name")
                ),
                params![pattern],
            )?,
            None => self.db.select(
                &format!("SELECT id, version, name, created_on, checksum FROM {models} ORDER BY id, version"),
                &[],
            )?,
        };
        Ok(cursor
            .map(|row| ModelSummary {
                id: row.get_string("id").unwrap_or_default(),
                version: row.get_i64("version"),
                name: row.get_string("name").unwrap_or_default(),
                created_on: row.get_timestamp("created_on"),
                checksum: row.get_string("checksum"),
            })
            .collect())
    }

    // ── Folders ───────────────────────────────────────────────

    /// Open the folder stream, ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns an error if `import_model` has not run or the query fails.
    pub fn prepare_import_folders(&mut self, model: &Model) -> Result<()> {
        let sql = format!("{} ORDER BY fim.rank", self.request(Category::Folders)?);
        self.open_cursor(
            Category::Folders,
            &sql,
            params![model.id, model.initial_version.version],
        )
    }

    /// Materialize the next folder. Returns `false` once exhausted.
    ///
    /// Folders without a parent become root folders and keep their stored
    /// type. The others are user folders attached to their parent, which
    /// rank ordering has already imported, or failing that to the root
    /// folder of their root type.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFolder` if neither folder is in the model.
    pub fn import_folders(&mut self, model: &mut Model) -> Result<bool> {
        let Some(row) = self.next_row(Category::Folders) else {
            return Ok(false);
        };
        let id = required_id(&row, "id", Kind::Folder)?;
        let (handle, _) = model.upsert(Kind::Folder, &id, "Folder");
        {
            let component = model.component_mut(handle)?;
            component.version = VersionSet::from_store(version_record(&row));
            if let Some(folder) = component.as_folder_mut() {
                mapping::apply_folder(folder, &row);
            }
        }

        match row.get_non_empty("parent_folder_id") {
            None => model.add_root_folder(handle)?,
            Some(parent_id) => {
                if let Some(folder) = model.component_mut(handle)?.as_folder_mut() {
                    folder.folder_type = FolderType::User;
                }
                let root_type = FolderType::from_value(row.get_i64("root_type"));
                let parent = model
                    .registry()
                    .folder(&parent_id)
                    .or_else(|| model.root_folder(root_type))
                    .ok_or_else(|| Error::UnknownFolder {
                        kind: Kind::Folder,
                        id: parent_id.clone(),
                    })?;
                model.attach_to_folder(parent, handle)?;
            }
        }

        self.import_properties(model, handle)?;
        model.count_object(handle, false, None)?;
        self.stats.folders.imported += 1;
        debug!(folder = %model.component(handle)?.debug_name(), "imported folder");
        Ok(true)
    }

    // ── Elements ──────────────────────────────────────────────

    /// Open the element stream, ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns an error if `import_model` has not run or the query fails.
    pub fn prepare_import_elements(&mut self, model: &Model) -> Result<()> {
        let sql = format!("{} ORDER BY eim.rank", self.request(Category::Elements)?);
        self.open_cursor(
            Category::Elements,
            &sql,
            params![model.id, model.initial_version.version],
        )
    }

    /// Materialize the next element. Returns `false` once exhausted.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` for a class that is not an element, or
    /// `UnknownFolder` if no folder can receive it.
    pub fn import_elements(&mut self, model: &mut Model) -> Result<bool> {
        let Some(row) = self.next_row(Category::Elements) else {
            return Ok(false);
        };
        let id = required_id(&row, "id", Kind::Element)?;
        let class = row.get_string("class").unwrap_or_default();
        Kind::Element.expect_class(&class)?;

        let (handle, _) = model.upsert(Kind::Element, &id, &class);
        {
            let component = model.component_mut(handle)?;
            component.version = VersionSet::from_store(version_record(&row));
            if let ComponentBody::Element(element) = &mut component.body {
                mapping::apply_element(element, &row);
            }
        }
        Self::attach_to_parent_folder(model, handle, Kind::Element, &class, &row)?;

        self.import_properties(model, handle)?;
        model.count_object(handle, false, None)?;
        self.stats.elements.imported += 1;
        debug!(element = %model.component(handle)?.debug_name(), "imported element");
        Ok(true)
    }

    // ── Relationships ─────────────────────────────────────────

    /// Open the relationship stream, ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns an error if `import_model` has not run or the query fails.
    pub fn prepare_import_relationships(&mut self, model: &Model) -> Result<()> {
        let sql = format!("{} ORDER BY rim.rank", self.request(Category::Relationships)?);
        self.open_cursor(
            Category::Relationships,
            &sql,
            params![model.id, model.initial_version.version],
        )
    }

    /// Materialize the next relationship. Returns `false` once exhausted.
    ///
    /// Endpoints already registered are bound immediately; the others are
    /// registered for resolution once every relationship is in.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` for a class that is not a relationship, or
    /// `UnknownFolder` if no folder can receive it.
    pub fn import_relationships(&mut self, model: &mut Model) -> Result<bool> {
        let Some(row) = self.next_row(Category::Relationships) else {
            return Ok(false);
        };
        let id = required_id(&row, "id", Kind::Relationship)?;
        let class = row.get_string("class").unwrap_or_default();
        Kind::Relationship.expect_class(&class)?;

        let (handle, _) = model.upsert(Kind::Relationship, &id, &class);
        {
            let component = model.component_mut(handle)?;
            component.version = VersionSet::from_store(version_record(&row));
            if let ComponentBody::Relationship(relationship) = &mut component.body {
                mapping::apply_relationship(relationship, &row);
            }
        }
        Self::bind_relationship_ends(model, handle, &row)?;
        Self::attach_to_parent_folder(model, handle, Kind::Relationship, &class, &row)?;

        self.import_properties(model, handle)?;
        model.count_object(handle, false, None)?;
        self.stats.relationships.imported += 1;
        debug!(relationship = %model.component(handle)?.debug_name(), "imported relationship");
        Ok(true)
    }

    pub(crate) fn bind_relationship_ends(model: &mut Model, handle: Handle, row: &Row) -> Result<()> {
        for (end, column) in [(End::Source, "source_id"), (End::Target, "target_id")] {
            let endpoint_id = row.get_string(column).unwrap_or_default();
            match model.registry().concept(&endpoint_id) {
                Some(endpoint) => model.bind_relationship_end(handle, endpoint, end)?,
                None => model.set_pending_relationship_end(handle, &endpoint_id, end)?,
            }
        }
        Ok(())
    }

    // ── Views ─────────────────────────────────────────────────

    /// Open the view stream, ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns an error if `import_model` has not run or the query fails.
    pub fn prepare_import_views(&mut self, model: &Model) -> Result<()> {
        let sql = format!("{} ORDER BY vim.rank", self.request(Category::Views)?);
        self.open_cursor(
            Category::Views,
            &sql,
            params![model.id, model.initial_version.version],
        )
    }

    /// Materialize the next view, without its content. Returns `false`
    /// once exhausted.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` for a class that is not a view, or
    /// `UnknownFolder` if no folder can receive it.
    pub fn import_views(&mut self, model: &mut Model) -> Result<bool> {
        let Some(row) = self.next_row(Category::Views) else {
            return Ok(false);
        };
        let id = required_id(&row, "id", Kind::View)?;
        let class = row.get_string("class").unwrap_or_default();
        Kind::View.expect_class(&class)?;

        let (handle, _) = model.upsert(Kind::View, &id, &class);
        {
            let component = model.component_mut(handle)?;
            component.version = VersionSet::from_store(version_record(&row));
            if let ComponentBody::View(view) = &mut component.body {
                mapping::apply_view(view, &row);
            }
        }
        Self::attach_to_parent_folder(model, handle, Kind::View, &class, &row)?;

        self.import_properties(model, handle)?;
        model.count_object(handle, false, None)?;
        self.stats.views.imported += 1;
        debug!(view = %model.component(handle)?.debug_name(), "imported view");
        Ok(true)
    }

    // ── View objects ──────────────────────────────────────────

    /// Open the stream of objects contained in one stored view version,
    /// containers before their content.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn prepare_import_views_objects(&mut self, view_id: &str, version: i64) -> Result<()> {
        let sql = format!(
            "SELECT {} FROM {} oiv JOIN {} o ON o.id = oiv.object_id AND o.version = oiv.object_version \
             WHERE oiv.view_id = ? AND oiv.view_version = ? ORDER BY oiv.rank",
            mapping::view_object_columns(self.db.dialect(), "o"),
            self.db.table("views_objects_in_view"),
            self.db.table("views_objects"),
        );
        self.open_cursor(Category::ViewObjects, &sql, params![view_id, version])
    }

    /// Materialize the next object of `view`. Returns `false` once
    /// exhausted.
    ///
    /// An element shown by the object that is not in the model yet is
    /// imported first, together with the relationships it takes part in.
    ///
    /// # Errors
    ///
    /// Returns `DanglingReference` if the object's container is neither
    /// the view nor one of its objects.
    pub fn import_views_objects(&mut self, model: &mut Model, view: Handle) -> Result<bool> {
        let Some(row) = self.next_row(Category::ViewObjects) else {
            return Ok(false);
        };
        let stored_id = required_id(&row, "id", Kind::ViewObject)?;
        let handle = self.materialize_view_object(model, &stored_id, &row)?;

        let container_id = self.local_id(&row.get_string("container_id").unwrap_or_default());
        let container = if model.component(view)?.id() == container_id {
            Some(view)
        } else {
            model.registry().view_object(&container_id)
        }
        .ok_or_else(|| Error::DanglingReference {
            kind: Kind::ViewObject,
            component: stored_id.clone(),
            reference: container_id.clone(),
        })?;
        model.attach_to_container(container, handle)?;

        if row.get_non_empty("element_id").is_none() {
            self.import_properties_from(model, handle, &stored_id, row.get_i64("version"))?;
        }
        model.count_object(handle, false, Some(view))?;
        self.stats.view_objects.imported += 1;
        trace!(object = %model.component(handle)?.debug_name(), "imported view object");
        Ok(true)
    }

    /// Create or update a view object from its row, without placing it.
    pub(crate) fn materialize_view_object(
        &mut self,
        model: &mut Model,
        stored_id: &str,
        row: &Row,
    ) -> Result<Handle> {
        let class = row.get_string("class").unwrap_or_default();
        Kind::ViewObject.expect_class(&class)?;

        let element_id = row.get_non_empty("element_id");
        if let Some(element_id) = &element_id {
            if model.registry().element(element_id).is_none() {
                self.import_element_from_id(model, None, element_id, 0, false, true)?;
            }
        }
        let concept = element_id.and_then(|id| model.registry().element(&id));
        let diagram_ref = row
            .get_non_empty("diagram_ref_id")
            .and_then(|id| model.registry().view(&self.local_id(&id)));

        let handle = self.materialize(model, Kind::ViewObject, stored_id, &class, row)?;
        if let ComponentBody::ViewObject(object) = &mut model.component_mut(handle)?.body {
            mapping::apply_view_object(object, row);
            object.concept = concept;
            object.diagram_ref = diagram_ref;
            if let Some(path) = &object.image_path {
                self.image_paths.insert(path.clone());
            }
        }
        Ok(handle)
    }

    // ── View connections ──────────────────────────────────────

    /// Open the stream of connections contained in one stored view
    /// version.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn prepare_import_views_connections(&mut self, view_id: &str, version: i64) -> Result<()> {
        let sql = format!(
            "SELECT {} FROM {} civ JOIN {} c ON c.id = civ.connection_id AND c.version = civ.connection_version \
             WHERE civ.view_id = ? AND civ.view_version = ? ORDER BY civ.rank",
            mapping::view_connection_columns(self.db.dialect(), "c"),
            self.db.table("views_connections_in_view"),
            self.db.table("views_connections"),
        );
        self.open_cursor(Category::ViewConnections, &sql, params![view_id, version])
    }

    /// Materialize the next connection of `view`. Returns `false` once
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` for a class that is not a connection.
    pub fn import_views_connections(&mut self, model: &mut Model, view: Handle) -> Result<bool> {
        let Some(row) = self.next_row(Category::ViewConnections) else {
            return Ok(false);
        };
        let stored_id = required_id(&row, "id", Kind::ViewConnection)?;
        let handle = self.materialize_view_connection(model, &stored_id, &row)?;
        model.count_object(handle, false, Some(view))?;
        self.stats.view_connections.imported += 1;
        trace!(connection = %model.component(handle)?.debug_name(), "imported view connection");
        Ok(true)
    }

    /// Create or update a view connection from its row, with its
    /// bendpoints, properties and endpoints.
    pub(crate) fn materialize_view_connection(
        &mut self,
        model: &mut Model,
        stored_id: &str,
        row: &Row,
    ) -> Result<Handle> {
        let class = row.get_string("class").unwrap_or_default();
        Kind::ViewConnection.expect_class(&class)?;
        let relationship_id = row.get_non_empty("relationship_id");
        let concept = relationship_id
            .as_deref()
            .and_then(|id| model.registry().relationship(id));

        let handle = self.materialize(model, Kind::ViewConnection, stored_id, &class, row)?;
        let stored_version = row.get_i64("version");
        let bendpoints = self.bendpoints(stored_id, stored_version)?;
        if let ComponentBody::ViewConnection(connection) = &mut model.component_mut(handle)?.body {
            mapping::apply_view_connection(connection, row);
            connection.concept = concept;
            connection.bendpoints = bendpoints;
        }

        for (end, column) in [(End::Source, "source_object_id"), (End::Target, "target_object_id")] {
            let endpoint_id = self.local_ids(&row.get_string(column).unwrap_or_default());
            match model.registry().connectable(&endpoint_id) {
                Some(endpoint) => model.bind_connection_end(handle, endpoint, end)?,
                None => model.set_pending_connection_end(handle, &endpoint_id, end)?,
            }
        }

        if relationship_id.is_none() {
            self.import_properties_from(model, handle, stored_id, stored_version)?;
        }
        Ok(handle)
    }

    fn bendpoints(&self, id: &str, version: i64) -> Result<Vec<Bendpoint>> {
        let sql = format!(
            "SELECT start_x, start_y, end_x, end_y FROM {} WHERE parent_id = ? AND parent_version = ? ORDER BY rank",
            self.db.table("bendpoints")
        );
        Ok(self
            .db
            .select(&sql, params![id, version])?
            .map(|row| Bendpoint {
                start_x: row.get_i64("start_x"),
                start_y: row.get_i64("start_y"),
                end_x: row.get_i64("end_x"),
                end_y: row.get_i64("end_y"),
            })
            .collect())
    }

    // ── Shared helpers ────────────────────────────────────────

    /// In-place: find or create the component and take the row's
    /// versions. While copying view content: create a fresh component
    /// under a new id and remember the mapping.
    pub(crate) fn materialize(
        &mut self,
        model: &mut Model,
        kind: Kind,
        stored_id: &str,
        class: &str,
        row: &Row,
    ) -> Result<Handle> {
        if let Some(ids) = self.copy_ids.as_mut() {
            let id = model.generate_id();
            ids.insert(stored_id.to_string(), id.clone());
            let mut component = Component::new(id, class, ComponentBody::empty(kind));
            component.version = VersionSet::copy();
            return Ok(model.add(component));
        }
        let (handle, _) = model.upsert(kind, stored_id, class);
        model.component_mut(handle)?.version = VersionSet::from_store(version_record(row));
        Ok(handle)
    }

    /// Identifier a stored id is known under in the model.
    pub(crate) fn local_id(&self, stored_id: &str) -> String {
        self.copy_ids
            .as_ref()
            .and_then(|ids| ids.get(stored_id))
            .cloned()
            .unwrap_or_else(|| stored_id.to_string())
    }

    /// [`Self::local_id`] applied to each entry of a comma separated list.
    fn local_ids(&self, stored_ids: &str) -> String {
        if self.copy_ids.is_none() || !stored_ids.contains(',') {
            return self.local_id(stored_ids);
        }
        stored_ids
            .split(',')
            .map(|id| self.local_id(id.trim()))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Components materialized from now on are copies under fresh ids.
    pub(crate) fn start_copy(&mut self) {
        self.copy_ids = Some(HashMap::new());
    }

    pub(crate) fn remember_copy(&mut self, stored_id: &str, id: &str) {
        if let Some(ids) = self.copy_ids.as_mut() {
            ids.insert(stored_id.to_string(), id.to_string());
        }
    }

    pub(crate) fn end_copy(&mut self) {
        self.copy_ids = None;
    }

    fn attach_to_parent_folder(
        model: &mut Model,
        handle: Handle,
        kind: Kind,
        class: &str,
        row: &Row,
    ) -> Result<()> {
        let folder = row
            .get_non_empty("parent_folder_id")
            .and_then(|id| model.registry().folder(&id))
            .or_else(|| model.default_folder_for(kind, class))
            .ok_or_else(|| Error::UnknownFolder {
                kind,
                id: row.get_string("parent_folder_id").unwrap_or_default(),
            })?;
        model.attach_to_folder(folder, handle)
    }

    // ── Properties ────────────────────────────────────────────

    /// Replace a component's properties with those stored for its initial
    /// version.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn import_properties(&self, model: &mut Model, handle: Handle) -> Result<()> {
        let component = model.component(handle)?;
        let id = component.id().to_string();
        let version = component.version.initial.version;
        self.import_properties_from(model, handle, &id, version)
    }

    pub(crate) fn import_properties_from(
        &self,
        model: &mut Model,
        handle: Handle,
        id: &str,
        version: i64,
    ) -> Result<()> {
        let properties = self.key_values("properties", id, version)?;
        model.component_mut(handle)?.properties = properties;
        Ok(())
    }

    fn import_model_properties(&self, model: &mut Model) -> Result<()> {
        model.properties = self.key_values("properties", &model.id, model.initial_version.version)?;
        Ok(())
    }

    /// Replace the model's metadata entries with the stored ones.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn import_metadata(&self, model: &mut Model) -> Result<()> {
        model.metadata = self.key_values("metadata", &model.id, model.initial_version.version)?;
        Ok(())
    }

    fn key_values(&self, table: &str, id: &str, version: i64) -> Result<Vec<Property>> {
        let sql = format!(
            "SELECT name, value FROM {} WHERE parent_id = ? AND parent_version = ? ORDER BY rank",
            self.db.table(table)
        );
        Ok(self
            .db
            .select(&sql, params![id, version])?
            .map(|row| Property::new(row.get_string("name").unwrap_or_default(), row.get_string("value")))
            .collect())
    }

    // ── Images ────────────────────────────────────────────────

    /// Copy one stored image into the archive. Returns the path the
    /// archive stored it under.
    ///
    /// # Errors
    ///
    /// Returns `ImageNotFound` if no image is stored under `path`.
    pub fn import_image(&mut self, archive: &mut dyn ArchiveManager, path: &str) -> Result<String> {
        let sql = format!("SELECT image FROM {} WHERE path = ?", self.db.table("images"));
        let bytes = self
            .db
            .select_one(&sql, params![path])?
            .and_then(|row| row.get_blob("image"))
            .ok_or_else(|| Error::ImageNotFound {
                path: path.to_string(),
            })?;
        let stored = archive.add_byte_content_entry(path, bytes)?;
        self.stats.images.imported += 1;
        trace!(path, stored = %stored, "imported image");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `ImageCountMismatch` if fewer or more images were imported
    /// than announced.
    pub fn check_imported_images_count(&self) -> Result<()> {
        if self.stats.images.matches() {
            return Ok(());
        }
        Err(Error::ImageCountMismatch {
            expected: self.stats.images.expected,
            imported: self.stats.images.imported,
        })
    }

    /// Paths of every stored image.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn get_image_list(&self) -> Result<Vec<String>> {
        let sql = format!("SELECT path FROM {} ORDER BY path", self.db.table("images"));
        Ok(self
            .db
            .select(&sql, &[])?
            .filter_map(|row| row.get_string("path"))
            .collect())
    }

    /// Bytes of a stored image, `None` if there is none under `path`.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn get_image(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let sql = format!("SELECT image FROM {} WHERE path = ?", self.db.table("images"));
        Ok(self
            .db
            .select_one(&sql, params![path])?
            .and_then(|row| row.get_blob("image")))
    }

    // ── Checks ────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `CountMismatch` listing every category whose imported count
    /// differs from the announced one.
    pub fn check_import_counts(&self) -> Result<()> {
        let discrepancies = self.stats.discrepancies();
        if discrepancies.is_empty() {
            Ok(())
        } else {
            Err(Error::CountMismatch(discrepancies))
        }
    }

    /// A stored row with its properties and, for connections, bendpoints.
    /// Version 0 reads the newest version.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn get_object(&self, id: &str, kind: Kind, version: i64) -> Result<Option<StoredObject>> {
        let table = self.db.table(kind.table());
        let selector = VersionSelector::requested(version).render(&table, "t.id");
        let sql = format!("SELECT * FROM {table} t WHERE t.id = ? AND t.version = {selector}");
        let Some(row) = self.db.select_one(&sql, params![id])? else {
            return Ok(None);
        };
        let stored_version = row.get_i64("version");
        let bendpoints = if kind == Kind::ViewConnection {
            self.bendpoints(id, stored_version)?
        } else {
            Vec::new()
        };
        Ok(Some(StoredObject {
            kind,
            row: row.to_json(),
            properties: self.key_values("properties", id, stored_version)?,
            bendpoints,
        }))
    }

    // ── Driver ────────────────────────────────────────────────

    /// Run every import step for `model`, record the checksum baselines
    /// and check the counts.
    ///
    /// # Errors
    ///
    /// Propagates the first error of any step; the model is then partially
    /// populated.
    pub fn import_full_model(
        &mut self,
        model: &mut Model,
        archive: &mut dyn ArchiveManager,
    ) -> Result<ImportStats> {
        self.import_model(model)?;

        self.prepare_import_folders(model)?;
        while self.import_folders(model)? {}
        model.create_default_folders()?;

        self.prepare_import_elements(model)?;
        while self.import_elements(model)? {}

        self.prepare_import_relationships(model)?;
        while self.import_relationships(model)? {}
        model.resolve_relationships_sources_and_targets()?;

        self.prepare_import_views(model)?;
        while self.import_views(model)? {}

        let views: Vec<(Handle, String, i64)> = model
            .registry()
            .all(Kind::View)
            .iter()
            .filter_map(|(id, handle)| {
                let version = model.get(*handle)?.version.initial.version;
                Some((*handle, id.clone(), version))
            })
            .collect();
        for (view, id, version) in views {
            self.prepare_import_views_objects(&id, version)?;
            while self.import_views_objects(model, view)? {}
            self.prepare_import_views_connections(&id, version)?;
            while self.import_views_connections(model, view)? {}
        }
        model.resolve_connections_sources_and_targets()?;

        self.set_folder_to_last_known(model)?;
        model.record_checksum_baselines()?;

        let paths: Vec<String> = self.image_paths.iter().cloned().collect();
        for path in paths {
            self.import_image(archive, &path)?;
        }

        self.check_import_counts()?;
        self.check_imported_images_count()?;
        info!(
            model = %model.id,
            components = self.stats.total_imported(),
            images = self.stats.images.imported,
            "model imported"
        );
        Ok(self.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ref;
    use crate::sync::archive::MemoryArchive;
    use crate::sync::fixture::seeded;

    fn name_of(model: &Model, kind: Kind, id: &str) -> String {
        let handle = model.registry().get(kind, id).unwrap();
        model.component(handle).unwrap().name().to_string()
    }

    #[test]
    fn test_import_model_announces_counts() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);

        let total = connection.import_model(&mut model).unwrap();

        assert_eq!(total, 14);
        let stats = connection.stats();
        assert_eq!(stats.folders.expected, 4);
        assert_eq!(stats.elements.expected, 2);
        assert_eq!(stats.relationships.expected, 2);
        assert_eq!(stats.views.expected, 1);
        assert_eq!(stats.view_objects.expected, 4);
        assert_eq!(stats.view_connections.expected, 1);
        assert_eq!(stats.images.expected, 1);

        assert_eq!(model.name, "Bank");
        assert_eq!(model.purpose.as_deref(), Some("Retail banking landscape"));
        assert_eq!(model.initial_version.checksum.as_deref(), Some("cm1"));
        assert_eq!(model.latest_database_version.version, 2);
        assert_eq!(model.properties.len(), 1);
        assert_eq!(model.metadata[0].key, "language");
    }

    #[test]
    fn test_import_model_version_zero_selects_newest() {
        let mut connection = seeded();
        let mut model = Model::new("m1");
        connection.import_model(&mut model).unwrap();
        assert_eq!(model.initial_version.version, 2);
        assert_eq!(model.current_version.version, 2);
        assert!(model.is_latest_version_imported());
    }

    #[test]
    fn test_import_model_not_found() {
        let mut connection = seeded();

        let mut missing = Model::new("nope");
        assert!(matches!(
            connection.import_model(&mut missing),
            Err(Error::ModelNotFound { version: None, .. })
        ));

        let mut wrong_version = Model::new("m1").with_version(7);
        assert!(matches!(
            connection.import_model(&mut wrong_version),
            Err(Error::ModelNotFound { version: Some(7), .. })
        ));
    }

    #[test]
    fn test_prepare_before_import_model_fails() {
        let mut connection = seeded();
        let model = Model::new("m1").with_version(1);
        assert!(matches!(
            connection.prepare_import_folders(&model),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cursor_states() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        connection.import_model(&mut model).unwrap();
        assert_eq!(connection.state(Category::Folders), CursorState::NotStarted);

        connection.prepare_import_folders(&model).unwrap();
        assert_eq!(connection.state(Category::Folders), CursorState::Prepared);
        assert!(connection.import_folders(&mut model).unwrap());
        assert_eq!(connection.state(Category::Folders), CursorState::Streaming);

        // opening the next stream abandons the unfinished one
        connection.prepare_import_elements(&model).unwrap();
        assert_eq!(connection.state(Category::Folders), CursorState::Exhausted);
        assert!(!connection.import_folders(&mut model).unwrap());

        while connection.import_elements(&mut model).unwrap() {}
        assert_eq!(connection.state(Category::Elements), CursorState::Exhausted);
        assert!(!connection.import_elements(&mut model).unwrap());
    }

    #[test]
    fn test_import_full_model() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        let mut archive = MemoryArchive::new();

        let stats = connection.import_full_model(&mut model, &mut archive).unwrap();

        assert_eq!(stats.total_imported(), 14);
        assert_eq!(stats.images.imported, 1);
        assert_eq!(
            archive.get("images/logo.png"),
            Some(&[0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A][..])
        );

        assert_eq!(name_of(&model, Kind::Element, "e1"), "Customer");
        let e1 = model.registry().element("e1").unwrap();
        assert_eq!(model.component(e1).unwrap().properties.len(), 2);
        assert_eq!(model.component(e1).unwrap().version.initial.version, 1);

        // r2 was streamed before its target r1
        let r1 = model.registry().relationship("r1").unwrap();
        let r2 = model.registry().relationship("r2").unwrap();
        let association = model.component(r2).unwrap().as_relationship().unwrap();
        assert_eq!(association.target, Ref::Resolved(r1));
        assert!(model.registry().pending_relationship_targets().is_empty());

        // the nested note sits in the group, which carries its own properties
        let o3 = model.registry().view_object("o3").unwrap();
        let o4 = model.registry().view_object("o4").unwrap();
        assert_eq!(model.component(o4).unwrap().parent, Some(o3));
        assert_eq!(model.component(o3).unwrap().properties.len(), 1);

        let c1 = model.registry().view_connection("c1").unwrap();
        let connection_body = model.component(c1).unwrap().as_view_connection().unwrap();
        assert_eq!(connection_body.concept, Some(r1));
        assert_eq!(connection_body.bendpoints.len(), 1);
        assert_eq!(
            connection_body.source,
            Ref::Resolved(model.registry().view_object("o1").unwrap())
        );

        // missing standard root folders were created
        assert!(model.root_folder(FolderType::Strategy).is_some());
        assert_eq!(model.root_folders().len(), 9);
    }

    #[test]
    fn test_import_twice_updates_in_place() {
        let mut connection = seeded();
        let mut model = Model::new("m1");
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();
        let size = model.len();
        let roots = model.root_folders().to_vec();
        let e1 = model.registry().element("e1").unwrap();

        let stats = connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();

        assert_eq!(stats.total_imported(), 14);
        assert_eq!(model.len(), size);
        assert_eq!(model.root_folders(), &roots[..]);
        assert_eq!(model.registry().element("e1"), Some(e1));
        let business = model
            .root_folders()
            .iter()
            .filter(|root| {
                model.component(**root).unwrap().as_folder().unwrap().folder_type
                    == FolderType::Business
            })
            .count();
        assert_eq!(business, 1);
        let view = model.registry().view("v1").unwrap();
        assert_eq!(model.component(view).unwrap().children().len(), 3);
    }

    #[test]
    fn test_import_is_repeatable() {
        fn checksums(connection: &mut ImportConnection) -> Vec<(String, Option<String>)> {
            let mut model = Model::new("m1")
                .with_version(1)
                .with_id_generator(Box::new(crate::model::SequentialGenerator::new("id")));
            connection
                .import_full_model(&mut model, &mut MemoryArchive::new())
                .unwrap();
            let mut sums: Vec<(String, Option<String>)> = model
                .components()
                .map(|(_, component)| {
                    (component.id().to_string(), component.version.current.checksum.clone())
                })
                .collect();
            sums.sort();
            sums
        }

        let mut connection = seeded();
        let first = checksums(&mut connection);
        let second = checksums(&mut connection);
        assert!(first.len() >= 14);
        let e1 = first.iter().find(|(id, _)| id == "e1").unwrap();
        assert!(e1.1.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_import_preserves_view_order() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();

        let view = model.registry().view("v1").unwrap();
        let children: Vec<&str> = model
            .component(view)
            .unwrap()
            .children()
            .into_iter()
            .map(|child| model.component(child).unwrap().id())
            .collect();
        assert_eq!(children, vec!["o1", "o2", "o3"]);
    }

    #[test]
    fn test_import_folder_with_unknown_parent_uses_root_type() {
        let mut connection = seeded();
        connection
            .database()
            .execute(
                "UPDATE folders_in_model SET parent_folder_id = 'f-gone' WHERE folder_id = 'f-sub'",
                &[],
            )
            .unwrap();
        let mut model = Model::new("m1");
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();
        let sub = model.registry().folder("f-sub").unwrap();
        assert_eq!(model.component(sub).unwrap().parent, model.registry().folder("f-bus"));

        // no Application root in the store
        connection
            .database()
            .execute("UPDATE folders SET root_type = 2 WHERE id = 'f-sub'", &[])
            .unwrap();
        let mut model = Model::new("m1");
        let err = connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownFolder { kind: Kind::Folder, .. }));
    }

    #[test]
    fn test_import_subfolder_as_user_folder() {
        let mut connection = seeded();
        connection
            .database()
            .execute("UPDATE folders SET type = 1 WHERE id = 'f-sub'", &[])
            .unwrap();
        let mut model = Model::new("m1");
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();

        let sub = model.registry().folder("f-sub").unwrap();
        let folder = model.component(sub).unwrap().as_folder().unwrap();
        assert_eq!(folder.folder_type, FolderType::User);
        assert_eq!(model.root_folders().len(), 9);
    }

    #[test]
    fn test_import_older_version_relocates_to_last_known_folder() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();

        let e2 = model.registry().element("e2").unwrap();
        let business = model.registry().folder("f-bus").unwrap();
        assert_eq!(model.component(e2).unwrap().parent, Some(business));
        let e1 = model.registry().element("e1").unwrap();
        assert_eq!(
            model.component(e1).unwrap().parent,
            model.registry().folder("f-sub")
        );
    }

    #[test]
    fn test_import_latest_component_versions() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        model.set_import_latest_version(true);
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();

        assert_eq!(name_of(&model, Kind::Element, "e1"), "Client");
        // no relocation when the newest versions are imported
        let e2 = model.registry().element("e2").unwrap();
        assert_eq!(
            model.component(e2).unwrap().parent,
            model.registry().folder("f-sub")
        );
    }

    #[test]
    fn test_check_import_counts_reports_discrepancies() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        connection.import_model(&mut model).unwrap();
        connection.prepare_import_folders(&model).unwrap();
        while connection.import_folders(&mut model).unwrap() {}

        let Err(Error::CountMismatch(discrepancies)) = connection.check_import_counts() else {
            panic!("expected a count mismatch");
        };
        let categories: Vec<&str> = discrepancies.iter().map(|d| d.category).collect();
        assert_eq!(
            categories,
            vec!["elements", "relationships", "views", "views objects", "views connections"]
        );
        assert!(matches!(
            connection.check_imported_images_count(),
            Err(Error::ImageCountMismatch { expected: 1, imported: 0 })
        ));
    }

    #[test]
    fn test_images() {
        let mut connection = seeded();
        assert_eq!(connection.get_image_list().unwrap(), vec!["images/logo.png"]);
        assert!(connection.get_image("images/logo.png").unwrap().is_some());
        assert!(connection.get_image("missing.png").unwrap().is_none());

        let mut archive = MemoryArchive::new();
        assert!(matches!(
            connection.import_image(&mut archive, "missing.png"),
            Err(Error::ImageNotFound { .. })
        ));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_get_object() {
        let connection = seeded();

        let newest = connection.get_object("e1", Kind::Element, 0).unwrap().unwrap();
        assert_eq!(newest.row["name"], "Client");
        assert_eq!(newest.row["version"], 2);
        assert!(newest.properties.is_empty());

        let first = connection.get_object("e1", Kind::Element, 1).unwrap().unwrap();
        assert_eq!(first.row["name"], "Customer");
        assert_eq!(first.properties.len(), 2);

        let connection_row = connection
            .get_object("c1", Kind::ViewConnection, 0)
            .unwrap()
            .unwrap();
        assert_eq!(connection_row.bendpoints.len(), 1);
        assert_eq!(connection_row.bendpoints[0].start_x, 40);

        assert!(connection.get_object("zz", Kind::Element, 0).unwrap().is_none());
    }

    #[test]
    fn test_list_models() {
        let connection = seeded();
        let all = connection.list_models(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!((all[0].id.as_str(), all[0].version), ("m1", 1));

        let filtered = connection.list_models(Some("insur%")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Insurance");

        assert_eq!(connection.get_latest_model_version("m1").unwrap(), 2);
        assert_eq!(connection.get_latest_model_version("nope").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_shares_store() {
        let connection = seeded();
        let duplicate = connection.duplicate();
        assert!(duplicate.database().is_duplicate());
        duplicate.close().unwrap();
        assert_eq!(connection.get_image_list().unwrap().len(), 1);
    }
}
