//! Column lists and row-to-component field mapping.
//!
//! Bulk streams and single-object imports read the same columns; the
//! select lists are built here so both stay in step.

use crate::error::{Error, Result};
use crate::model::{
    Bounds, Element, Folder, FolderType, Kind, Relationship, VersionRecord, View, ViewConnection,
    ViewObject,
};
use crate::storage::{Dialect, Row};

/// Select list of the `folders` table under `alias`.
pub fn folder_columns(dialect: Dialect, alias: &str) -> String {
    format!(
        "{a}.version AS version, {a}.type AS type, {a}.root_type AS root_type, \
         {a}.name AS name, {doc}, {a}.created_on AS created_on, {a}.checksum AS checksum",
        a = alias,
        doc = dialect.documentation(&format!("{alias}.documentation")),
    )
}

pub fn element_columns(dialect: Dialect, alias: &str) -> String {
    format!(
        "{a}.version AS version, {a}.class AS class, {a}.name AS name, {doc}, \
         {a}.type AS type, {a}.created_on AS created_on, {a}.checksum AS checksum",
        a = alias,
        doc = dialect.documentation(&format!("{alias}.documentation")),
    )
}

pub fn relationship_columns(dialect: Dialect, alias: &str) -> String {
    format!(
        "{a}.version AS version, {a}.class AS class, {a}.name AS name, {doc}, \
         {a}.source_id AS source_id, {a}.target_id AS target_id, {a}.strength AS strength, \
         {a}.access_type AS access_type, {a}.created_on AS created_on, {a}.checksum AS checksum",
        a = alias,
        doc = dialect.documentation(&format!("{alias}.documentation")),
    )
}

pub fn view_columns(dialect: Dialect, alias: &str) -> String {
    format!(
        "{a}.version AS version, {a}.class AS class, {a}.name AS name, {doc}, \
         {a}.background AS background, {a}.connection_router_type AS connection_router_type, \
         {a}.hint_content AS hint_content, {a}.hint_title AS hint_title, \
         {a}.viewpoint AS viewpoint, {a}.created_on AS created_on, {a}.checksum AS checksum, \
         {a}.container_checksum AS container_checksum",
        a = alias,
        doc = dialect.documentation(&format!("{alias}.documentation")),
    )
}

pub fn view_object_columns(dialect: Dialect, alias: &str) -> String {
    let plain = [
        "id",
        "version",
        "class",
        "container_id",
        "element_id",
        "diagram_ref_id",
        "type",
        "border_color",
        "border_type",
        "content",
        "hint_content",
        "hint_title",
        "is_locked",
        "image_path",
        "image_position",
        "line_color",
        "line_width",
        "fill_color",
        "font",
        "font_color",
        "name",
        "notes",
        "text_alignment",
        "text_position",
        "x",
        "y",
        "width",
        "height",
        "created_on",
        "checksum",
    ];
    with_documentation(dialect, alias, &plain)
}

pub fn view_connection_columns(dialect: Dialect, alias: &str) -> String {
    let plain = [
        "id",
        "version",
        "class",
        "container_id",
        "name",
        "is_locked",
        "line_color",
        "line_width",
        "font",
        "font_color",
        "relationship_id",
        "source_object_id",
        "target_object_id",
        "text_position",
        "type",
        "created_on",
        "checksum",
    ];
    with_documentation(dialect, alias, &plain)
}

fn with_documentation(dialect: Dialect, alias: &str, columns: &[&str]) -> String {
    let mut list: Vec<String> = columns
        .iter()
        .map(|column| format!("{alias}.{column} AS {column}"))
        .collect();
    list.push(dialect.documentation(&format!("{alias}.documentation")));
    list.join(", ")
}

// ── Row mapping ───────────────────────────────────────────────

/// Identifier column that must be present.
pub fn required_id(row: &Row, column: &str, kind: Kind) -> Result<String> {
    row.get_non_empty(column)
        .ok_or_else(|| Error::Other(format!("{kind} row without {column}")))
}

/// Version, checksum and creation timestamp of a stored row.
pub fn version_record(row: &Row) -> VersionRecord {
    VersionRecord::new(
        row.get_i64("version"),
        row.get_string("checksum"),
        row.get_timestamp("created_on"),
    )
    .with_container_checksum(row.get_string("container_checksum"))
}

pub fn apply_element(element: &mut Element, row: &Row) {
    element.name = row.get_string("name").unwrap_or_default();
    element.documentation = row.get_string("documentation");
    element.element_type = row.get_non_empty("type");
}

/// Scalar fields only; endpoints are bound separately.
pub fn apply_relationship(relationship: &mut Relationship, row: &Row) {
    relationship.name = row.get_string("name").unwrap_or_default();
    relationship.documentation = row.get_string("documentation");
    relationship.strength = row.get_string("strength");
    relationship.access_type = row.get_i64("access_type");
}

pub fn apply_folder(folder: &mut Folder, row: &Row) {
    folder.name = row.get_string("name").unwrap_or_default();
    folder.documentation = row.get_string("documentation");
    folder.folder_type = FolderType::from_value(row.get_i64("type"));
    folder.root_type = FolderType::from_value(row.get_i64("root_type"));
}

pub fn apply_view(view: &mut View, row: &Row) {
    view.name = row.get_string("name").unwrap_or_default();
    view.documentation = row.get_string("documentation");
    view.viewpoint = row.get_non_empty("viewpoint");
    view.background = row.get_i64("background");
    view.connection_router_type = row.get_i64("connection_router_type");
    view.hint_content = row.get_string("hint_content");
    view.hint_title = row.get_string("hint_title");
}

/// Scalar fields and bounds; concept, container and connections are
/// bound by the caller.
pub fn apply_view_object(object: &mut ViewObject, row: &Row) {
    object.object_type = row.get_i64("type");
    object.border_color = row.get_string("border_color");
    object.border_type = row.get_i64("border_type");
    object.content = row.get_string("content");
    object.documentation = row.get_string("documentation");
    object.hint_content = row.get_string("hint_content");
    object.hint_title = row.get_string("hint_title");
    object.is_locked = row.get_bool("is_locked");
    object.image_path = row.get_non_empty("image_path");
    object.image_position = row.get_i64("image_position");
    object.line_color = row.get_string("line_color");
    object.line_width = row.get_i64("line_width");
    object.fill_color = row.get_string("fill_color");
    object.font = row.get_string("font");
    object.font_color = row.get_string("font_color");
    object.notes = row.get_string("notes");
    object.text_alignment = row.get_i64("text_alignment");
    object.text_position = row.get_i64("text_position");
    object.bounds = Bounds {
        x: row.get_i64("x"),
        y: row.get_i64("y"),
        width: row.get_i64("width"),
        height: row.get_i64("height"),
    };
    // an ArchiMate object shows its element's name
    object.name = if row.get_non_empty("element_id").is_some() {
        None
    } else {
        row.get_string("name")
    };
}

pub fn apply_view_connection(connection: &mut ViewConnection, row: &Row) {
    connection.name = row.get_string("name");
    connection.documentation = row.get_string("documentation");
    connection.is_locked = row.get_bool("is_locked");
    connection.line_color = row.get_string("line_color");
    connection.line_width = row.get_i64("line_width");
    connection.font = row.get_string("font");
    connection.font_color = row.get_string("font_color");
    connection.text_position = row.get_i64("text_position");
    connection.connection_type = row.get_i64("type");
}
