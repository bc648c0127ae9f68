//! Moving components to the folders they were last stored in.
//!
//! An older model snapshot places components in the folders of that
//! snapshot. When the store holds a newer snapshot, components the newer
//! one placed elsewhere are moved to match it.

use rusqlite::params;
use tracing::{debug, trace};

use super::import::ImportConnection;
use crate::error::{Error, Result};
use crate::model::{FolderType, Handle, Kind, Model};

impl ImportConnection {
    /// Move every folder, element, relationship and view whose parent
    /// folder differs in the newest stored snapshot of the model. Returns
    /// the number of components moved.
    ///
    /// Nothing moves when the imported snapshot is already the newest one
    /// or when latest component versions were imported.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub fn set_folder_to_last_known(&mut self, model: &mut Model) -> Result<usize> {
        if model.is_latest_version_imported() {
            trace!(model = %model.id, "latest version imported, no relocation");
            return Ok(0);
        }

        let mut moved = 0;
        for kind in [Kind::Folder, Kind::Element, Kind::Relationship, Kind::View] {
            let Some((association, id_column)) = kind.model_association() else {
                continue;
            };
            let table = self.database().table(association);
            let sql = format!(
                "SELECT m2.{id_column} AS component_id, m2.parent_folder_id AS parent_folder_id \
                 FROM {table} m1 JOIN {table} m2 ON m2.{id_column} = m1.{id_column} AND m2.model_id = m1.model_id \
                 WHERE m1.model_id = ? AND m1.model_version = ? AND m2.model_version = ? \
                 AND m1.parent_folder_id <> m2.parent_folder_id"
            );
            let rows = self.database().select(
                &sql,
                params![
                    model.id,
                    model.initial_version.version,
                    model.latest_database_version.version
                ],
            )?;
            for row in rows {
                let (Some(component_id), Some(parent_id)) =
                    (row.get_non_empty("component_id"), row.get_non_empty("parent_folder_id"))
                else {
                    continue;
                };
                let registry = model.registry();
                let (Some(handle), Some(folder)) = (registry.get(kind, &component_id), registry.folder(&parent_id))
                else {
                    trace!(%kind, id = %component_id, folder = %parent_id, "cannot relocate, not in model");
                    continue;
                };
                if handle == folder || model.component(handle)?.parent == Some(folder) {
                    continue;
                }
                model.attach_to_folder(folder, handle)?;
                moved += 1;
            }
        }
        debug!(model = %model.id, moved, "relocated components to last known folders");
        Ok(moved)
    }

    /// Place one component in the folder it was last stored in, across
    /// every version of the model, or in the default folder of its kind.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFolder` if neither folder exists in the model.
    pub fn set_component_folder_to_last_known(&mut self, model: &mut Model, handle: Handle) -> Result<()> {
        let id = model.component(handle)?.id().to_string();
        self.relocate_component(model, handle, &id)
    }

    /// Same as [`Self::set_component_folder_to_last_known`], looking up the
    /// stored placement of `stored_id` (the source of a copy).
    ///
    /// A folder stored under a parent becomes a user folder; a folder
    /// stored without one keeps its type and, unless it is a user folder,
    /// becomes a root folder.
    pub(crate) fn relocate_component(&self, model: &mut Model, handle: Handle, stored_id: &str) -> Result<()> {
        let component = model.component(handle)?;
        let kind = component.kind();
        let class = component.class.clone();
        let folder_types = component.as_folder().map(|f| (f.folder_type, f.root_type));
        let parent_id = self.last_known_parent(model, kind, stored_id)?;

        if let Some((folder_type, _)) = folder_types {
            if parent_id.is_some() {
                if let Some(folder) = model.component_mut(handle)?.as_folder_mut() {
                    folder.folder_type = FolderType::User;
                }
            } else if folder_type != FolderType::User {
                return model.add_root_folder(handle);
            }
        }
        let root_type = folder_types.map(|(_, root_type)| root_type);

        let last_known = parent_id.and_then(|parent| model.registry().folder(&parent));
        let fallback = match root_type {
            Some(root_type) => model.root_folder(root_type),
            None => model.default_folder_for(kind, &class),
        };

        match last_known.or(fallback) {
            Some(folder) if folder != handle => {
                trace!(%kind, id = stored_id, "placing component");
                model.attach_to_folder(folder, handle)
            }
            _ => Err(Error::UnknownFolder {
                kind,
                id: model.component(handle)?.id().to_string(),
            }),
        }
    }

    /// Parent folder of `stored_id` in the newest model version that holds it.
    fn last_known_parent(&self, model: &Model, kind: Kind, stored_id: &str) -> Result<Option<String>> {
        let Some((association, id_column)) = kind.model_association() else {
            return Ok(None);
        };
        let table = self.database().table(association);
        let sql = format!(
            "SELECT parent_folder_id FROM {table} WHERE model_id = ? AND {id_column} = ? \
             AND model_version = (SELECT MAX(model_version) FROM {table} WHERE model_id = ? AND {id_column} = ?)"
        );
        Ok(self
            .database()
            .select_one(&sql, params![model.id, stored_id, model.id, stored_id])?
            .and_then(|row| row.get_non_empty("parent_folder_id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, ComponentBody, Element};
    use crate::sync::archive::MemoryArchive;
    use crate::sync::fixture::seeded;

    #[test]
    fn test_set_folder_to_last_known_moves_changed_parents() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        connection.import_model(&mut model).unwrap();
        connection.prepare_import_folders(&model).unwrap();
        while connection.import_folders(&mut model).unwrap() {}
        connection.prepare_import_elements(&model).unwrap();
        while connection.import_elements(&mut model).unwrap() {}

        let e2 = model.registry().element("e2").unwrap();
        assert_eq!(model.component(e2).unwrap().parent, model.registry().folder("f-sub"));

        assert_eq!(connection.set_folder_to_last_known(&mut model).unwrap(), 1);
        assert_eq!(model.component(e2).unwrap().parent, model.registry().folder("f-bus"));

        // already in place
        assert_eq!(connection.set_folder_to_last_known(&mut model).unwrap(), 0);
    }

    #[test]
    fn test_set_folder_to_last_known_skips_newest_snapshot() {
        let mut connection = seeded();
        let mut model = Model::new("m1");
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();
        assert_eq!(connection.set_folder_to_last_known(&mut model).unwrap(), 0);
    }

    #[test]
    fn test_set_component_folder_to_last_known() {
        let mut connection = seeded();
        let mut model = Model::new("m1").with_version(1);
        connection
            .import_full_model(&mut model, &mut MemoryArchive::new())
            .unwrap();

        let e2 = model.registry().element("e2").unwrap();
        let sub = model.registry().folder("f-sub").unwrap();
        model.attach_to_folder(sub, e2).unwrap();
        connection.set_component_folder_to_last_known(&mut model, e2).unwrap();
        assert_eq!(model.component(e2).unwrap().parent, model.registry().folder("f-bus"));

        let diagrams = model.registry().folder("f-dia").unwrap();
        connection.set_component_folder_to_last_known(&mut model, diagrams).unwrap();
        assert!(model.root_folders().contains(&diagrams));
    }

    #[test]
    fn test_subfolder_stays_under_its_parent() {
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
        let bus = model.registry().folder("f-bus");
        connection.set_component_folder_to_last_known(&mut model, sub).unwrap();

        let folder = model.component(sub).unwrap().as_folder().unwrap();
        assert_eq!(folder.folder_type, FolderType::User);
        assert_eq!(folder.root_type, FolderType::Business);
        assert_eq!(model.component(sub).unwrap().parent, bus);
        assert!(!model.root_folders().contains(&sub));
    }

    #[test]
    fn test_set_component_folder_without_candidate() {
        let connection = seeded();
        let mut model = Model::new("m1");
        let orphan = model.add(Component::new(
            "zz",
            "BusinessActor",
            ComponentBody::Element(Element::default()),
        ));
        assert!(matches!(
            connection.relocate_component(&mut model, orphan, "zz"),
            Err(Error::UnknownFolder { kind: Kind::Element, .. })
        ));
    }
}
