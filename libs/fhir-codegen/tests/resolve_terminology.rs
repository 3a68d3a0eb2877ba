mod test_support;

use serde_json::json;
use test_support::*;
use typegraph_codegen::ir::{TypeCategory, TypeKind};
use typegraph_codegen::{resolve, ResolverConfig};
use typegraph_loader::Document;

const ANIMALS: &str = "http://example.org/CodeSystem/animals";

fn animals() -> Document {
    code_system(
        ANIMALS,
        "Animals",
        json!([
            {
                "code": "animal",
                "display": "Animal",
                "concept": [
                    { "code": "dog", "display": "Dog", "concept": [{ "code": "puppy", "display": "Puppy" }] },
                    { "code": "cat", "display": "Cat" }
                ]
            }
        ]),
    )
}

fn resolve_bound(value_set_url: &str, extra: Vec<Document>) -> typegraph_codegen::Resolution {
    let mut all = vec![primitive("code"), bound_resource("Host", value_set_url)];
    all.extend(extra);
    resolve(&documents(all), &ResolverConfig::default())
}

#[test]
fn test_binding_attaches_enum_name() {
    let url = "http://hl7.org/fhir/ValueSet/observation-status";
    let resolution = resolve_bound(
        url,
        vec![value_set(
            url,
            "ObservationStatus",
            json!({ "include": [{
                "system": "http://hl7.org/fhir/observation-status",
                "concept": [{ "code": "final", "display": "Final" }, { "code": "amended", "display": "Amended" }]
            }]}),
        )],
    );

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert_eq!(type_names(&resolution), vec!["code", "ObservationStatus", "Host"]);
    let TypeKind::Reference(reference) = &property(&resolution, "Host", "value").kind else {
        panic!("expected reference");
    };
    assert_eq!(reference.name, "code");
    assert_eq!(reference.binding.as_deref(), Some("ObservationStatus"));
    assert_eq!(
        resolution.get("ObservationStatus").map(|n| n.category),
        Some(TypeCategory::ValueSet)
    );
    assert_eq!(member_names(&resolution, "ObservationStatus"), vec!["Final", "Amended"]);
}

#[test]
fn test_comparator_codes_use_operator_names() {
    let url = "http://hl7.org/fhir/ValueSet/quantity-comparator";
    let resolution = resolve_bound(
        url,
        vec![value_set(
            url,
            "QuantityComparator",
            json!({ "include": [{
                "system": "http://hl7.org/fhir/quantity-comparator",
                "concept": [
                    { "code": "<", "display": "Less than" },
                    { "code": "<=", "display": "Less or Equal to" },
                    { "code": ">=", "display": "Greater or Equal to" },
                    { "code": ">", "display": "Greater than" }
                ]
            }]}),
        )],
    );

    assert_eq!(
        member_names(&resolution, "QuantityComparator"),
        vec!["LessThan", "LessThanOrEqual", "GreaterThanOrEqual", "GreaterThan"]
    );
}

#[test]
fn test_colliding_codes_from_two_systems_get_numeric_suffix() {
    let url = "http://example.org/ValueSet/statuses";
    let resolution = resolve_bound(
        url,
        vec![value_set(
            url,
            "Statuses",
            json!({ "include": [
                { "system": "http://example.org/a", "concept": [{ "code": "active", "display": "Active" }] },
                { "system": "http://example.org/b", "concept": [{ "code": "active", "display": "Active (Other)" }] }
            ]}),
        )],
    );

    let enumeration = resolution.get("Statuses").and_then(|n| n.as_enum()).unwrap();
    let summary: Vec<_> = enumeration
        .members
        .iter()
        .map(|m| (m.name.as_str(), m.system.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Active", Some("http://example.org/a")),
            ("Active_1", Some("http://example.org/b")),
        ]
    );
    assert!(enumeration.members.iter().all(|m| m.case_sensitive == Some(true)));
}

#[test]
fn test_include_without_concepts_takes_whole_system() {
    let url = "http://example.org/ValueSet/all-animals";
    let resolution = resolve_bound(
        url,
        vec![
            animals(),
            value_set(url, "AllAnimals", json!({ "include": [{ "system": ANIMALS }] })),
        ],
    );

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert_eq!(
        member_names(&resolution, "AllAnimals"),
        vec!["Animal", "Dog", "Puppy", "Cat"]
    );
    let enumeration = resolution.get("AllAnimals").and_then(|n| n.as_enum()).unwrap();
    assert!(enumeration.members.iter().all(|m| m.parent.is_none()));
    // The code system was only consulted, never published.
    assert!(resolution.get("Animals").is_none());
}

#[test]
fn test_inline_concepts_are_intersected_with_system() {
    let url = "http://example.org/ValueSet/pets";
    let resolution = resolve_bound(
        url,
        vec![
            animals(),
            value_set(
                url,
                "Pets",
                json!({ "include": [{
                    "system": ANIMALS,
                    "concept": [{ "code": "cat" }, { "code": "unicorn", "display": "Unicorn" }]
                }]}),
            ),
        ],
    );

    let enumeration = resolution.get("Pets").and_then(|n| n.as_enum()).unwrap();
    assert_eq!(enumeration.members.len(), 1);
    assert_eq!(enumeration.members[0].name, "Cat");
    assert_eq!(enumeration.members[0].display.as_deref(), Some("Cat"));
}

#[test]
fn test_is_a_filter_collects_descendants() {
    let url = "http://example.org/ValueSet/dogs";
    let resolution = resolve_bound(
        url,
        vec![
            animals(),
            value_set(
                url,
                "Dogs",
                json!({ "include": [{
                    "system": ANIMALS,
                    "filter": [{ "property": "concept", "op": "is-a", "value": "dog" }]
                }]}),
            ),
        ],
    );

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert_eq!(member_names(&resolution, "Dogs"), vec!["Dog", "Puppy"]);
}

#[test]
fn test_unsupported_filter_is_reported() {
    let url = "http://example.org/ValueSet/odd";
    let resolution = resolve_bound(
        url,
        vec![
            animals(),
            value_set(
                url,
                "Odd",
                json!({ "include": [{
                    "system": ANIMALS,
                    "filter": [{ "property": "concept", "op": "regex", "value": "d.*" }]
                }]}),
            ),
        ],
    );

    assert_eq!(
        resolution.errors(),
        ["odd.valueset.json: unsupported filter 'concept regex'"]
    );
    assert!(member_names(&resolution, "Odd").is_empty());
}

#[test]
fn test_value_set_references_are_merged() {
    let base_url = "http://example.org/ValueSet/base-status";
    let url = "http://example.org/ValueSet/extended-status";
    let resolution = resolve_bound(
        url,
        vec![
            value_set(
                base_url,
                "BaseStatus",
                json!({ "include": [{
                    "system": "http://example.org/status",
                    "concept": [{ "code": "open", "display": "Open" }]
                }]}),
            ),
            value_set(
                url,
                "ExtendedStatus",
                json!({
                    "import": [base_url],
                    "include": [
                        { "valueSet": [base_url] },
                        { "system": "http://example.org/status", "concept": [{ "code": "closed", "display": "Closed" }] }
                    ]
                }),
            ),
        ],
    );

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    // The second copy of "open" is identical and dropped.
    assert_eq!(member_names(&resolution, "ExtendedStatus"), vec!["Open", "Closed"]);
    assert!(resolution.get("BaseStatus").is_none());
}

#[test]
fn test_missing_value_set_reference_is_reported() {
    let url = "http://example.org/ValueSet/broken";
    let resolution = resolve_bound(
        url,
        vec![value_set(
            url,
            "Broken",
            json!({ "include": [{ "valueSet": ["http://example.org/ValueSet/missing"] }] }),
        )],
    );

    assert_eq!(
        resolution.errors(),
        ["broken.valueset.json: unresolved value set 'http://example.org/ValueSet/missing'"]
    );
    assert!(resolution.get("Broken").is_some());
}

#[test]
fn test_unresolved_binding_keeps_property() {
    let resolution = resolve_bound("http://example.org/ValueSet/nowhere", vec![]);

    assert_eq!(
        resolution.errors(),
        ["host.profile.json: unresolved value set 'http://example.org/ValueSet/nowhere'"]
    );
    let TypeKind::Reference(reference) = &property(&resolution, "Host", "value").kind else {
        panic!("expected reference");
    };
    assert_eq!(reference.binding, None);
}

#[test]
fn test_vs_segment_retry_and_url_rewrite() {
    let resolution = resolve_bound(
        "http://hl7.org/fhir/ValueSet/contact-relationship",
        vec![value_set(
            "http://hl7.org/fhir/ValueSet/vs/contact-relationship",
            "ContactRelationship",
            json!({ "include": [{ "system": "urn:rel", "concept": [{ "code": "family" }] }] }),
        )],
    );
    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert!(resolution.get("ContactRelationship").is_some());

    let resolution = resolve_bound(
        "http://www.rfc-editor.org/bcp/bcp13.txt",
        vec![value_set(
            "http://hl7.org/fhir/ValueSet/mimetypes",
            "Mimetypes",
            json!({ "include": [{ "system": "urn:ietf:bcp:13" }] }),
        )],
    );
    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    let TypeKind::Reference(reference) = &property(&resolution, "Host", "value").kind else {
        panic!("expected reference");
    };
    assert_eq!(reference.binding.as_deref(), Some("Mimetypes"));
}

#[test]
fn test_binding_to_structure_is_rejected() {
    let mut map = documents([
        primitive("code"),
        bound_resource("Host", "http://hl7.org/fhir/StructureDefinition/code"),
    ]);
    map.add_alias("http://hl7.org/fhir/StructureDefinition/code", "code");
    let resolution = resolve(&map, &ResolverConfig::default());

    assert_eq!(
        resolution.errors(),
        ["host.profile.json: binding 'http://hl7.org/fhir/StructureDefinition/code' does not resolve to an enumerated type"]
    );
}

#[test]
fn test_inline_code_system_is_reachable_through_alias() {
    let gender_url = "http://hl7.org/fhir/ValueSet/administrative-gender";
    let gender = document(
        "valuesets.json",
        json!({
            "resourceType": "ValueSet",
            "url": gender_url,
            "name": "AdministrativeGender",
            "codeSystem": {
                "system": "http://hl7.org/fhir/administrative-gender",
                "caseSensitive": true,
                "concept": [
                    { "code": "male", "display": "Male" },
                    { "code": "female", "display": "Female" }
                ]
            }
        }),
    );
    let url = "http://example.org/ValueSet/binary-gender";
    let binary = value_set(
        url,
        "BinaryGender",
        json!({ "include": [{ "system": "http://hl7.org/fhir/administrative-gender" }] }),
    );

    let mut map = documents([primitive("code"), bound_resource("Host", url), gender, binary]);
    map.add_alias("http://hl7.org/fhir/administrative-gender", gender_url);
    let resolution = resolve(&map, &ResolverConfig::default());

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert_eq!(member_names(&resolution, "BinaryGender"), vec!["Male", "Female"]);
}

#[test]
fn test_value_sets_including_each_other_resolve_without_errors() {
    let first = "http://example.org/ValueSet/first";
    let second = "http://example.org/ValueSet/second";
    let resolution = resolve_bound(
        first,
        vec![
            value_set(
                first,
                "First",
                json!({ "include": [
                    { "system": "urn:numbers", "concept": [{ "code": "one" }] },
                    { "valueSet": [second] }
                ]}),
            ),
            value_set(
                second,
                "Second",
                json!({ "include": [
                    { "system": "urn:numbers", "concept": [{ "code": "two" }] },
                    { "valueSet": [first] }
                ]}),
            ),
        ],
    );

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert_eq!(member_names(&resolution, "First"), vec!["One", "Two"]);
}

#[test]
fn test_filter_on_own_inline_system_is_not_an_error() {
    let url = "http://example.org/ValueSet/shapes";
    let system = "http://example.org/shapes";
    let shapes = document(
        "valuesets.json",
        json!({
            "resourceType": "ValueSet",
            "url": url,
            "name": "Shapes",
            "codeSystem": {
                "system": system,
                "concept": [{ "code": "circle", "display": "Circle" }]
            },
            "compose": { "include": [{
                "system": system,
                "filter": [{ "property": "concept", "op": "is-a", "value": "circle" }]
            }]}
        }),
    );

    let mut map = documents([primitive("code"), bound_resource("Host", url), shapes]);
    map.add_alias(system, url);
    let resolution = resolve(&map, &ResolverConfig::default());

    assert!(resolution.errors().is_empty(), "{:?}", resolution.errors());
    assert_eq!(member_names(&resolution, "Shapes"), vec!["Circle"]);
}
