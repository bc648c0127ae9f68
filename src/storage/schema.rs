//! Database schema definitions.
//!
//! Every versioned table is keyed by `(id, version)`: a new row is written
//! each time a component changes, and the `*_in_model` / `*_in_view`
//! association tables record which component version belongs to which
//! model or view version, with a `rank` giving the order inside the
//! parent. Properties, metadata and bendpoints hang off a
//! `(parent_id, parent_version)` pair.

use rusqlite::{Connection, Result};

/// Current schema version recorded in `database_version`.
pub const CURRENT_SCHEMA_VERSION: i64 = 211;

/// The complete SQL schema.
///
/// Timestamps are stored as INTEGER (Unix milliseconds).
pub const SCHEMA_SQL: &str = r"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS database_version (
    archi_plugin TEXT NOT NULL,
    version INTEGER NOT NULL
);

-- ====================
-- Models
-- ====================

CREATE TABLE IF NOT EXISTS models (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    name TEXT NOT NULL,
    note TEXT,
    purpose TEXT,
    created_by TEXT,
    created_on INTEGER,
    checkedin_by TEXT,
    checkedin_on INTEGER,
    deleted_by TEXT,
    deleted_on INTEGER,
    checksum TEXT,
    PRIMARY KEY (id, version)
);

-- ====================
-- Components
-- ====================

CREATE TABLE IF NOT EXISTS folders (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    type INTEGER NOT NULL DEFAULT 0,
    root_type INTEGER NOT NULL DEFAULT 0,
    name TEXT,
    documentation TEXT,
    created_by TEXT,
    created_on INTEGER,
    checkedin_by TEXT,
    checkedin_on INTEGER,
    deleted_by TEXT,
    deleted_on INTEGER,
    checksum TEXT NOT NULL,
    PRIMARY KEY (id, version)
);

CREATE TABLE IF NOT EXISTS elements (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    class TEXT NOT NULL,
    name TEXT,
    documentation TEXT,
    type TEXT,
    created_by TEXT,
    created_on INTEGER,
    checkedin_by TEXT,
    checkedin_on INTEGER,
    deleted_by TEXT,
    deleted_on INTEGER,
    checksum TEXT NOT NULL,
    PRIMARY KEY (id, version)
);

CREATE TABLE IF NOT EXISTS relationships (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    class TEXT NOT NULL,
    name TEXT,
    documentation TEXT,
    source_id TEXT,
    target_id TEXT,
    strength TEXT,
    access_type INTEGER,
    created_by TEXT,
    created_on INTEGER,
    checkedin_by TEXT,
    checkedin_on INTEGER,
    deleted_by TEXT,
    deleted_on INTEGER,
    checksum TEXT NOT NULL,
    PRIMARY KEY (id, version)
);

CREATE TABLE IF NOT EXISTS views (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    class TEXT NOT NULL,
    name TEXT,
    documentation TEXT,
    background INTEGER,
    connection_router_type INTEGER,
    hint_content TEXT,
    hint_title TEXT,
    viewpoint TEXT,
    screenshot BLOB,
    screenshot_scale_factor INTEGER,
    screenshot_border_width INTEGER,
    created_by TEXT,
    created_on INTEGER,
    checkedin_by TEXT,
    checkedin_on INTEGER,
    deleted_by TEXT,
    deleted_on INTEGER,
    checksum TEXT NOT NULL,
    container_checksum TEXT,
    PRIMARY KEY (id, version)
);

CREATE TABLE IF NOT EXISTS views_objects (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    class TEXT NOT NULL,
    container_id TEXT NOT NULL,
    element_id TEXT,
    diagram_ref_id TEXT,
    type INTEGER,
    border_color TEXT,
    border_type INTEGER,
    content TEXT,
    documentation TEXT,
    hint_content TEXT,
    hint_title TEXT,
    is_locked INTEGER,
    image_path TEXT,
    image_position INTEGER,
    line_color TEXT,
    line_width INTEGER,
    fill_color TEXT,
    alpha INTEGER,
    font TEXT,
    font_color TEXT,
    name TEXT,
    notes TEXT,
    text_alignment INTEGER,
    text_position INTEGER,
    x INTEGER,
    y INTEGER,
    width INTEGER,
    height INTEGER,
    created_by TEXT,
    created_on INTEGER,
    checksum TEXT NOT NULL,
    PRIMARY KEY (id, version)
);

CREATE TABLE IF NOT EXISTS views_connections (
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    class TEXT NOT NULL,
    container_id TEXT NOT NULL,
    name TEXT,
    documentation TEXT,
    is_locked INTEGER,
    line_color TEXT,
    line_width INTEGER,
    font TEXT,
    font_color TEXT,
    relationship_id TEXT,
    source_object_id TEXT,
    target_object_id TEXT,
    text_position INTEGER,
    type INTEGER,
    created_by TEXT,
    created_on INTEGER,
    checksum TEXT NOT NULL,
    PRIMARY KEY (id, version)
);

-- ====================
-- Associations
-- ====================

CREATE TABLE IF NOT EXISTS folders_in_model (
    fim_id INTEGER PRIMARY KEY AUTOINCREMENT,
    folder_id TEXT NOT NULL,
    folder_version INTEGER NOT NULL,
    parent_folder_id TEXT,
    model_id TEXT NOT NULL,
    model_version INTEGER NOT NULL,
    rank INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS elements_in_model (
    eim_id INTEGER PRIMARY KEY AUTOINCREMENT,
    element_id TEXT NOT NULL,
    element_version INTEGER NOT NULL,
    parent_folder_id TEXT,
    model_id TEXT NOT NULL,
    model_version INTEGER NOT NULL,
    rank INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS relationships_in_model (
    rim_id INTEGER PRIMARY KEY AUTOINCREMENT,
    relationship_id TEXT NOT NULL,
    relationship_version INTEGER NOT NULL,
    parent_folder_id TEXT,
    model_id TEXT NOT NULL,
    model_version INTEGER NOT NULL,
    rank INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS views_in_model (
    vim_id INTEGER PRIMARY KEY AUTOINCREMENT,
    view_id TEXT NOT NULL,
    view_version INTEGER NOT NULL,
    parent_folder_id TEXT,
    model_id TEXT NOT NULL,
    model_version INTEGER NOT NULL,
    rank INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS views_objects_in_view (
    oiv_id INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id TEXT NOT NULL,
    object_version INTEGER NOT NULL,
    view_id TEXT NOT NULL,
    view_version INTEGER NOT NULL,
    rank INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS views_connections_in_view (
    civ_id INTEGER PRIMARY KEY AUTOINCREMENT,
    connection_id TEXT NOT NULL,
    connection_version INTEGER NOT NULL,
    view_id TEXT NOT NULL,
    view_version INTEGER NOT NULL,
    rank INTEGER NOT NULL
);

-- ====================
-- Attached data
-- ====================

CREATE TABLE IF NOT EXISTS properties (
    parent_id TEXT NOT NULL,
    parent_version INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    name TEXT,
    value TEXT,
    PRIMARY KEY (parent_id, parent_version, rank)
);

CREATE TABLE IF NOT EXISTS metadata (
    parent_id TEXT NOT NULL,
    parent_version INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    name TEXT,
    value TEXT,
    PRIMARY KEY (parent_id, parent_version, rank)
);

CREATE TABLE IF NOT EXISTS bendpoints (
    parent_id TEXT NOT NULL,
    parent_version INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    start_x INTEGER NOT NULL,
    start_y INTEGER NOT NULL,
    end_x INTEGER NOT NULL,
    end_y INTEGER NOT NULL,
    PRIMARY KEY (parent_id, parent_version, rank)
);

CREATE TABLE IF NOT EXISTS images (
    path TEXT PRIMARY KEY,
    image BLOB NOT NULL
);

-- ====================
-- Indexes
-- ====================

CREATE INDEX IF NOT EXISTS idx_folders_in_model ON folders_in_model(model_id, model_version);
CREATE INDEX IF NOT EXISTS idx_elements_in_model ON elements_in_model(model_id, model_version);
CREATE INDEX IF NOT EXISTS idx_relationships_in_model ON relationships_in_model(model_id, model_version);
CREATE INDEX IF NOT EXISTS idx_views_in_model ON views_in_model(model_id, model_version);
CREATE INDEX IF NOT EXISTS idx_objects_in_view ON views_objects_in_view(view_id, view_version);
CREATE INDEX IF NOT EXISTS idx_connections_in_view ON views_connections_in_view(view_id, view_version);
CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_id);
CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target_id);
";

/// Every table created by [`SCHEMA_SQL`].
pub const TABLES: [&str; 18] = [
    "database_version",
    "models",
    "folders",
    "elements",
    "relationships",
    "views",
    "views_objects",
    "views_connections",
    "folders_in_model",
    "elements_in_model",
    "relationships_in_model",
    "views_in_model",
    "views_objects_in_view",
    "views_connections_in_view",
    "properties",
    "metadata",
    "bendpoints",
    "images",
];

/// Apply the schema to a database.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    conn.execute_batch(SCHEMA_SQL)?;

    let recorded: i64 = conn.query_row(
        "SELECT COUNT(*) FROM database_version WHERE archi_plugin = 'archisync'",
        [],
        |row| row.get(0),
    )?;
    if recorded == 0 {
        conn.execute(
            "INSERT INTO database_version (archi_plugin, version) VALUES ('archisync', ?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }

    Ok(())
}

/// Whether the schema has been applied to this database.
///
/// # Errors
///
/// Returns an error if `sqlite_master` cannot be queried.
pub fn is_initialized(conn: &Connection) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'models'")?
        .exists([])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).expect("Failed to apply schema");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in TABLES {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        apply_schema(&conn).expect("First apply failed");
        apply_schema(&conn).expect("Second apply failed");

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM database_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_is_initialized() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!is_initialized(&conn).unwrap());
        apply_schema(&conn).unwrap();
        assert!(is_initialized(&conn).unwrap());
    }

    #[test]
    fn test_versioned_primary_key() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let insert = "INSERT INTO elements (id, version, class, name, checksum)
                      VALUES ('e1', ?1, 'BusinessActor', 'Actor', 'x')";
        assert!(conn.execute(insert, [1]).is_ok());
        assert!(conn.execute(insert, [2]).is_ok());
        assert!(conn.execute(insert, [2]).is_err());
    }
}
