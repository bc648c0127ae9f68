//! Seeded in-memory store shared by the import tests.
//!
//! Model `m1` is stored twice. Version 2 renames element `e1` and moves
//! `e2` from the `f-sub` folder to `f-bus`. Relationship `r2` targets
//! relationship `r1`, which is ranked after it. View `v1` holds two
//! element objects, a group with an image and a note nested in the group,
//! plus one connection with a bendpoint.

use super::import::ImportConnection;
use crate::storage::Database;

pub const SEED_SQL: &str = "
INSERT INTO models (id, version, name, purpose, created_on, checksum) VALUES
    ('m1', 1, 'Bank', 'Retail banking landscape', 1700000000000, 'cm1'),
    ('m1', 2, 'Bank', 'Retail banking landscape', 1700000100000, 'cm2'),
    ('m2', 1, 'Insurance', NULL, 1700000200000, 'cm3');

INSERT INTO properties (parent_id, parent_version, rank, name, value) VALUES
    ('m1', 1, 0, 'owner', 'architecture team'),
    ('e1', 1, 0, 'criticality', 'high'),
    ('e1', 1, 1, 'region', 'emea'),
    ('o3', 1, 0, 'style', 'dashed');

INSERT INTO metadata (parent_id, parent_version, rank, name, value) VALUES
    ('m1', 1, 0, 'language', 'en');

INSERT INTO folders (id, version, type, root_type, name, checksum) VALUES
    ('f-bus', 1, 1, 1, 'Business', 'cf1'),
    ('f-rel', 1, 4, 4, 'Relations', 'cf2'),
    ('f-dia', 1, 6, 6, 'Views', 'cf3'),
    ('f-sub', 1, 0, 1, 'Actors', 'cf4');

INSERT INTO folders_in_model (folder_id, folder_version, parent_folder_id, model_id, model_version, rank) VALUES
    ('f-bus', 1, NULL, 'm1', 1, 0),
    ('f-rel', 1, NULL, 'm1', 1, 1),
    ('f-dia', 1, NULL, 'm1', 1, 2),
    ('f-sub', 1, 'f-bus', 'm1', 1, 3),
    ('f-bus', 1, NULL, 'm1', 2, 0),
    ('f-rel', 1, NULL, 'm1', 2, 1),
    ('f-dia', 1, NULL, 'm1', 2, 2),
    ('f-sub', 1, 'f-bus', 'm1', 2, 3);

INSERT INTO elements (id, version, class, name, checksum) VALUES
    ('e1', 1, 'BusinessActor', 'Customer', 'ce1'),
    ('e1', 2, 'BusinessActor', 'Client', 'ce1b'),
    ('e2', 1, 'BusinessRole', 'Account holder', 'ce2');

INSERT INTO elements_in_model (element_id, element_version, parent_folder_id, model_id, model_version, rank) VALUES
    ('e1', 1, 'f-sub', 'm1', 1, 0),
    ('e2', 1, 'f-sub', 'm1', 1, 1),
    ('e1', 2, 'f-sub', 'm1', 2, 0),
    ('e2', 1, 'f-bus', 'm1', 2, 1);

INSERT INTO relationships (id, version, class, name, source_id, target_id, checksum) VALUES
    ('r1', 1, 'AssignmentRelationship', 'plays', 'e1', 'e2', 'cr1'),
    ('r2', 1, 'AssociationRelationship', NULL, 'e1', 'r1', 'cr2');

INSERT INTO relationships_in_model (relationship_id, relationship_version, parent_folder_id, model_id, model_version, rank) VALUES
    ('r2', 1, 'f-rel', 'm1', 1, 0),
    ('r1', 1, 'f-rel', 'm1', 1, 1),
    ('r2', 1, 'f-rel', 'm1', 2, 0),
    ('r1', 1, 'f-rel', 'm1', 2, 1);

INSERT INTO views (id, version, class, name, viewpoint, checksum, container_checksum) VALUES
    ('v1', 1, 'ArchimateDiagramModel', 'Overview', 'organization', 'cv1', 'ccv1');

INSERT INTO views_in_model (view_id, view_version, parent_folder_id, model_id, model_version, rank) VALUES
    ('v1', 1, 'f-dia', 'm1', 1, 0),
    ('v1', 1, 'f-dia', 'm1', 2, 0);

INSERT INTO views_objects (id, version, class, container_id, element_id, name, content, image_path, x, y, width, height, checksum) VALUES
    ('o1', 1, 'DiagramModelArchimateObject', 'v1', 'e1', NULL, NULL, NULL, 10, 10, 120, 55, 'co1'),
    ('o2', 1, 'DiagramModelArchimateObject', 'v1', 'e2', NULL, NULL, NULL, 200, 10, 120, 55, 'co2'),
    ('o3', 1, 'DiagramModelGroup', 'v1', NULL, 'Channel', NULL, 'images/logo.png', 10, 100, 400, 200, 'co3'),
    ('o4', 1, 'DiagramModelNote', 'o3', NULL, NULL, 'Reviewed', NULL, 20, 30, 185, 80, 'co4');

INSERT INTO views_objects_in_view (object_id, object_version, view_id, view_version, rank) VALUES
    ('o1', 1, 'v1', 1, 0),
    ('o2', 1, 'v1', 1, 1),
    ('o3', 1, 'v1', 1, 2),
    ('o4', 1, 'v1', 1, 3);

INSERT INTO views_connections (id, version, class, container_id, relationship_id, source_object_id, target_object_id, checksum) VALUES
    ('c1', 1, 'DiagramModelArchimateConnection', 'v1', 'r1', 'o1', 'o2', 'cc1');

INSERT INTO views_connections_in_view (connection_id, connection_version, view_id, view_version, rank) VALUES
    ('c1', 1, 'v1', 1, 0);

INSERT INTO bendpoints (parent_id, parent_version, rank, start_x, start_y, end_x, end_y) VALUES
    ('c1', 1, 0, 40, 0, -40, 0);

INSERT INTO images (path, image) VALUES
    ('images/logo.png', X'89504E470D0A1A0A');
";

/// Import connection over an in-memory store holding [`SEED_SQL`].
pub fn seeded() -> ImportConnection {
    let db = Database::open_memory().unwrap();
    db.conn().execute_batch(SEED_SQL).unwrap();
    ImportConnection::new(db)
}
