//! Content hashing for change detection.
//!
//! A component checksum is the SHA-256 of the JSON serialization of a
//! fixed-order view of the component: kind, class, identifier, the scalar
//! fields of its kind, its properties in rank order and, for
//! relationships and connections, the identifiers of their endpoints.
//! Containment is not part of this view; `Model::count_object` appends
//! the checksums of view content afterwards.

use serde::Serialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::{Component, ComponentBody, Handle, Kind, Model, Property, Ref};

/// Compute a SHA256 hash of a serializable value.
///
/// The value is first serialized to JSON, then hashed, giving a
/// deterministic fingerprint of the content.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(hash_str(&json))
}

/// SHA256 of a string, as lowercase hex.
#[must_use]
pub fn hash_str(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check if a component changed since it was loaded.
///
/// Returns `true` if there is no stored hash (never persisted) or the
/// current hash differs from the stored one.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

#[derive(Serialize)]
struct ChecksumView<'a> {
    kind: Kind,
    class: &'a str,
    id: &'a str,
    fields: Vec<(&'static str, Value)>,
    properties: &'a [Property],
}

/// Checksum of a single component, without its content.
pub fn component_checksum(model: &Model, handle: Handle) -> Result<String> {
    let component = model.component(handle)?;
    let view = ChecksumView {
        kind: component.kind(),
        class: &component.class,
        id: component.id(),
        fields: checksum_fields(model, component),
        properties: &component.properties,
    };
    content_hash(&view)
}

fn checksum_fields(model: &Model, component: &Component) -> Vec<(&'static str, Value)> {
    match &component.body {
        ComponentBody::Element(e) => vec![
            ("name", json!(e.name)),
            ("documentation", json!(e.documentation)),
            ("type", json!(e.element_type)),
        ],
        ComponentBody::Relationship(r) => vec![
            ("name", json!(r.name)),
            ("documentation", json!(r.documentation)),
            ("source", json!(ref_id(model, &r.source))),
            ("target", json!(ref_id(model, &r.target))),
            ("strength", json!(r.strength)),
            ("access_type", json!(r.access_type)),
        ],
        ComponentBody::Folder(f) => vec![
            ("name", json!(f.name)),
            ("documentation", json!(f.documentation)),
            ("type", json!(f.folder_type.value())),
        ],
        ComponentBody::View(v) => vec![
            ("name", json!(v.name)),
            ("documentation", json!(v.documentation)),
            ("viewpoint", json!(v.viewpoint)),
            ("background", json!(v.background)),
            ("connection_router_type", json!(v.connection_router_type)),
            ("hint_content", json!(v.hint_content)),
            ("hint_title", json!(v.hint_title)),
        ],
        ComponentBody::ViewObject(o) => vec![
            ("element", json!(handle_id(model, o.concept))),
            ("diagram_ref", json!(handle_id(model, o.diagram_ref))),
            ("type", json!(o.object_type)),
            ("name", json!(o.name)),
            ("documentation", json!(o.documentation)),
            ("content", json!(o.content)),
            ("notes", json!(o.notes)),
            ("border_color", json!(o.border_color)),
            ("border_type", json!(o.border_type)),
            ("fill_color", json!(o.fill_color)),
            ("line_color", json!(o.line_color)),
            ("line_width", json!(o.line_width)),
            ("font", json!(o.font)),
            ("font_color", json!(o.font_color)),
            ("hint_content", json!(o.hint_content)),
            ("hint_title", json!(o.hint_title)),
            ("is_locked", json!(o.is_locked)),
            ("image_path", json!(o.image_path)),
            ("image_position", json!(o.image_position)),
            ("text_alignment", json!(o.text_alignment)),
            ("text_position", json!(o.text_position)),
            ("bounds", json!(o.bounds)),
        ],
        ComponentBody::ViewConnection(c) => vec![
            ("relationship", json!(handle_id(model, c.concept))),
            ("name", json!(c.name)),
            ("documentation", json!(c.documentation)),
            ("is_locked", json!(c.is_locked)),
            ("line_color", json!(c.line_color)),
            ("line_width", json!(c.line_width)),
            ("font", json!(c.font)),
            ("font_color", json!(c.font_color)),
            ("type", json!(c.connection_type)),
            ("text_position", json!(c.text_position)),
            ("source", json!(ref_id(model, &c.source))),
            ("target", json!(ref_id(model, &c.target))),
            ("bendpoints", json!(c.bendpoints)),
        ],
    }
}

fn ref_id<'a>(model: &'a Model, reference: &'a Ref) -> &'a str {
    match reference {
        Ref::Resolved(handle) => model.get(*handle).map_or("", Component::id),
        Ref::Pending(id) => id,
    }
}

fn handle_id(model: &Model, handle: Option<Handle>) -> Option<&str> {
    handle.and_then(|h| model.get(h)).map(Component::id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, End, Relationship};

    #[derive(Serialize)]
    struct TestRecord {
        id: String,
        value: i32,
    }

    fn concept_model() -> (Model, Handle, Handle, Handle) {
        let mut model = Model::new("m1");
        let a = model.add(Component::new(
            "a",
            "BusinessActor",
            ComponentBody::Element(Element {
                name: "Alice".to_string(),
                ..Element::default()
            }),
        ));
        let b = model.add(Component::new(
            "b",
            "BusinessRole",
            ComponentBody::Element(Element::default()),
        ));
        let rel = model.add(Component::new(
            "r",
            "AssignmentRelationship",
            ComponentBody::Relationship(Relationship::default()),
        ));
        model.bind_relationship_end(rel, a, End::Source).unwrap();
        model.bind_relationship_end(rel, b, End::Target).unwrap();
        (model, a, b, rel)
    }

    #[test]
    fn test_content_hash_deterministic() {
        let record = TestRecord {
            id: "test_1".into(),
            value: 42,
        };

        let hash1 = content_hash(&record).unwrap();
        let hash2 = content_hash(&record).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        let record1 = TestRecord {
            id: "test_1".into(),
            value: 42,
        };
        let record2 = TestRecord {
            id: "test_1".into(),
            value: 43,
        };

        assert_ne!(content_hash(&record1).unwrap(), content_hash(&record2).unwrap());
    }

    #[test]
    fn test_component_checksum_deterministic() {
        let (model, a, _, rel) = concept_model();
        assert_eq!(
            component_checksum(&model, a).unwrap(),
            component_checksum(&model, a).unwrap()
        );
        assert_ne!(
            component_checksum(&model, a).unwrap(),
            component_checksum(&model, rel).unwrap()
        );
    }

    #[test]
    fn test_checksum_covers_properties_in_order() {
        let (mut model, a, _, _) = concept_model();
        let bare = component_checksum(&model, a).unwrap();

        let component = model.component_mut(a).unwrap();
        component.properties = vec![
            Property::new("owner", Some("ops".to_string())),
            Property::new("tier", Some("1".to_string())),
        ];
        let ordered = component_checksum(&model, a).unwrap();
        assert_ne!(bare, ordered);

        model.component_mut(a).unwrap().properties.reverse();
        let reversed = component_checksum(&model, a).unwrap();
        assert_ne!(ordered, reversed);
    }

    #[test]
    fn test_pending_and_resolved_endpoints_hash_alike() {
        let (mut model, _, _, rel) = concept_model();
        let resolved = component_checksum(&model, rel).unwrap();

        if let ComponentBody::Relationship(r) = &mut model.component_mut(rel).unwrap().body {
            r.source = Ref::Pending("a".to_string());
            r.target = Ref::Pending("b".to_string());
        }
        assert_eq!(component_checksum(&model, rel).unwrap(), resolved);
    }

    #[test]
    fn test_unknown_handle_is_an_error() {
        let (model, ..) = concept_model();
        assert!(component_checksum(&model, Handle(99)).is_err());
    }

    #[test]
    fn test_has_changed() {
        assert!(has_changed("abc123", None));
        assert!(has_changed("abc123", Some("xyz789")));
        assert!(!has_changed("abc123", Some("abc123")));
    }
}
