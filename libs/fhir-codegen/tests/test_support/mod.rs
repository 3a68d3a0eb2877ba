//! Document builders shared by the integration tests
#![allow(dead_code)]

use serde_json::{json, Value};
use typegraph_codegen::ir::{TypeKind, TypeNode};
use typegraph_codegen::Resolution;
use typegraph_loader::{Document, DocumentMap};
use typegraph_models::Resource;

pub const PROFILE: &str = "http://hl7.org/fhir/StructureDefinition/";

/// Wrap parsed JSON as a document keyed the way the loader keys it
pub fn document(filename: &str, value: Value) -> Document {
    let resource = Resource::from_value(&value)
        .expect("valid resource")
        .expect("supported resource type");
    let id = match &resource {
        Resource::StructureDefinition(_) => resource.id(),
        _ => resource.url(),
    }
    .expect("identifier")
    .to_string();
    Document::new(id, filename, resource)
}

pub fn root(path: &str, short: &str) -> Value {
    json!({ "path": path, "short": short })
}

pub fn element(path: &str, types: &[&str], min: u32, max: &str) -> Value {
    let types: Vec<Value> = types.iter().map(|code| json!({ "code": code })).collect();
    json!({ "path": path, "short": path, "min": min, "max": max, "type": types })
}

/// Element with a required binding to `value_set`
pub fn bound(mut element: Value, value_set: &str) -> Value {
    element["binding"] = json!({
        "strength": "required",
        "valueSetReference": { "reference": value_set }
    });
    element
}

pub fn content_reference(path: &str, reference: &str, max: &str) -> Value {
    json!({ "path": path, "min": 0, "max": max, "contentReference": reference })
}

pub fn structure(id: &str, kind: &str, base: Option<&str>, elements: Vec<Value>) -> Document {
    let mut value = json!({
        "resourceType": "StructureDefinition",
        "id": id,
        "url": format!("{PROFILE}{id}"),
        "name": id,
        "kind": kind,
        "differential": { "element": elements }
    });
    if let Some(base) = base {
        value["baseDefinition"] = json!(format!("{PROFILE}{base}"));
    }
    document(&format!("{}.profile.json", id.to_lowercase()), value)
}

pub fn primitive(id: &str) -> Document {
    structure(
        id,
        "primitive-type",
        None,
        vec![root(id, &format!("Primitive Type {id}"))],
    )
}

pub fn value_set(url: &str, name: &str, compose: Value) -> Document {
    document(
        &format!("{}.valueset.json", name.to_lowercase()),
        json!({
            "resourceType": "ValueSet",
            "url": url,
            "name": name,
            "compose": compose
        }),
    )
}

pub fn code_system(url: &str, name: &str, concepts: Value) -> Document {
    document(
        &format!("{}.codesystem.json", name.to_lowercase()),
        json!({
            "resourceType": "CodeSystem",
            "url": url,
            "name": name,
            "caseSensitive": true,
            "concept": concepts
        }),
    )
}

/// A concrete resource with a single `value` element bound to `value_set`
pub fn bound_resource(id: &str, value_set: &str) -> Document {
    structure(
        id,
        "resource",
        None,
        vec![
            root(id, "Binding host"),
            bound(element(&format!("{id}.value"), &["code"], 0, "1"), value_set),
        ],
    )
}

/// The data types and abstract resources most tests build on
pub fn base_documents() -> Vec<Document> {
    vec![
        structure(
            "Element",
            "datatype",
            None,
            vec![
                root("Element", "Base for all elements"),
                element("Element.id", &["string"], 0, "1"),
            ],
        ),
        structure(
            "BackboneElement",
            "datatype",
            Some("Element"),
            vec![root("BackboneElement", "Base for nested elements")],
        ),
        primitive("string"),
        primitive("boolean"),
        primitive("code"),
        primitive("decimal"),
        structure(
            "Quantity",
            "datatype",
            Some("Element"),
            vec![
                root("Quantity", "A measured amount"),
                element("Quantity.value", &["decimal"], 0, "1"),
                element("Quantity.unit", &["string"], 0, "1"),
            ],
        ),
        structure(
            "Resource",
            "resource",
            None,
            vec![
                root("Resource", "Base Resource"),
                element("Resource.id", &["string"], 0, "1"),
            ],
        ),
        structure(
            "DomainResource",
            "resource",
            Some("Resource"),
            vec![root("DomainResource", "A resource with narrative")],
        ),
    ]
}

pub fn patient() -> Document {
    structure(
        "Patient",
        "resource",
        Some("DomainResource"),
        vec![
            root("Patient", "Information about an individual receiving care"),
            element("Patient.active", &["boolean"], 0, "1"),
            element("Patient.contact", &["BackboneElement"], 0, "*"),
            element("Patient.contact.name", &["string"], 0, "1"),
            content_reference("Patient.contact.related", "#Patient.contact", "*"),
        ],
    )
}

pub fn documents(documents: impl IntoIterator<Item = Document>) -> DocumentMap {
    let mut map = DocumentMap::new();
    for document in documents {
        map.insert(document).expect("unique document identifiers");
    }
    map
}

pub fn with_base(extra: impl IntoIterator<Item = Document>) -> DocumentMap {
    documents(base_documents().into_iter().chain(extra))
}

pub fn type_names(resolution: &Resolution) -> Vec<String> {
    resolution
        .types()
        .filter_map(|node| node.name().map(String::from))
        .collect()
}

pub fn property<'r>(resolution: &'r Resolution, type_name: &str, property: &str) -> &'r TypeNode {
    let node = resolution
        .get(type_name)
        .unwrap_or_else(|| panic!("type {type_name} not resolved"));
    let properties = node.properties().expect("type has properties");
    &properties
        .iter()
        .find(|p| p.name == property)
        .unwrap_or_else(|| panic!("{type_name} has no property {property}"))
        .type_node
}

pub fn property_names(resolution: &Resolution, type_name: &str) -> Vec<String> {
    resolution
        .get(type_name)
        .and_then(TypeNode::properties)
        .map(|properties| properties.iter().map(|p| p.name.clone()).collect())
        .unwrap_or_default()
}

pub fn member_names(resolution: &Resolution, enum_name: &str) -> Vec<String> {
    resolution
        .get(enum_name)
        .and_then(TypeNode::as_enum)
        .map(|e| e.members.iter().map(|m| m.name.clone()).collect())
        .unwrap_or_default()
}

pub fn reference_name(node: &TypeNode) -> Option<&str> {
    match &node.kind {
        TypeKind::Reference(reference) => Some(&reference.name),
        _ => None,
    }
}
