//! FHIR ElementDefinition model
//!
//! Version-tolerant model for ElementDefinition (used in StructureDefinition snapshots and differentials)

use super::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR ElementDefinition - defines an element in a resource or data type structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    #[serde(default)]
    pub path: String,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Full formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Comments about the use of this element
    #[serde(alias = "comments", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Minimum cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Maximum cardinality (can be "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Reference to definition of content if present ("#Path.to.element")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type and profile for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// ValueSet details if this is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Data type for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Data type code
    #[serde(default)]
    pub code: String,

    /// Profiles that apply (a single string before R4)
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub profile: Vec<String>,

    /// Profile for Reference/canonical target types
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub target_profile: Vec<String>,
}

impl ElementDefinitionType {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }
}

/// Binding strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

/// Reference to another resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// ValueSet binding for a coded element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    /// Binding strength (required | extensible | preferred | example)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<BindingStrength>,

    /// Human explanation of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source of value set (R4)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    /// Source of value set (DSTU2/STU3 uri form)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set_uri: Option<String>,

    /// Source of value set (DSTU2/STU3 reference form)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set_reference: Option<Reference>,
}

impl ElementDefinitionBinding {
    /// The bound value set's canonical URL, whichever spelling carried it
    pub fn value_set_url(&self) -> Option<&str> {
        self.value_set
            .as_deref()
            .or(self.value_set_uri.as_deref())
            .or_else(|| {
                self.value_set_reference
                    .as_ref()
                    .and_then(|r| r.reference.as_deref())
            })
    }

    /// Example bindings never constrain the element's type
    pub fn is_example(&self) -> bool {
        self.strength == Some(BindingStrength::Example)
    }
}

/// Snapshot - a set of elements that define the structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Snapshot {
    #[serde(default)]
    pub element: Vec<ElementDefinition>,
}

/// Differential - a set of elements that define changes from the base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Differential {
    #[serde(default)]
    pub element: Vec<ElementDefinition>,
}

impl Differential {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }
}

impl ElementDefinition {
    /// Create an element with only a path set
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Path segments split on '.'
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('.').collect()
    }

    /// Whether this is the root element of its structure (no dot in the path)
    pub fn is_root(&self) -> bool {
        !self.path.contains('.')
    }

    /// Get type codes for this element
    pub fn type_codes(&self) -> Vec<String> {
        self.types
            .as_ref()
            .map(|types| types.iter().map(|t| t.code.clone()).collect())
            .unwrap_or_default()
    }

    /// Check if element is required (min > 0)
    pub fn is_required(&self) -> bool {
        self.min.unwrap_or(0) > 0
    }

    /// Maximum cardinality "0": the element is forbidden here
    pub fn is_prohibited(&self) -> bool {
        self.max.as_deref() == Some("0")
    }

    /// Maximum cardinality exactly "1"
    pub fn is_single(&self) -> bool {
        self.max.as_deref() == Some("1")
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cardinality_helpers() {
        let elem: ElementDefinition = serde_json::from_value(json!({
            "path": "Patient.name",
            "min": 1,
            "max": "*"
        }))
        .unwrap();

        assert!(elem.is_required());
        assert!(!elem.is_single());
        assert!(!elem.is_prohibited());
        assert!(!elem.is_root());
    }

    #[test]
    fn test_profile_accepts_string_or_list() {
        let types: Vec<ElementDefinitionType> = serde_json::from_value(json!([
            { "code": "Reference", "profile": "http://hl7.org/fhir/StructureDefinition/Patient" },
            { "code": "Quantity", "profile": ["http://hl7.org/fhir/StructureDefinition/SimpleQuantity"] },
            { "code": "string" }
        ]))
        .unwrap();

        assert_eq!(types[0].profile.len(), 1);
        assert_eq!(types[1].profile.len(), 1);
        assert!(types[2].profile.is_empty());
    }

    #[test]
    fn test_binding_value_set_spellings() {
        let dstu2: ElementDefinitionBinding = serde_json::from_value(json!({
            "strength": "required",
            "valueSetReference": { "reference": "http://hl7.org/fhir/ValueSet/administrative-gender" }
        }))
        .unwrap();
        assert_eq!(
            dstu2.value_set_url(),
            Some("http://hl7.org/fhir/ValueSet/administrative-gender")
        );

        let uri: ElementDefinitionBinding = serde_json::from_value(json!({
            "strength": "example",
            "valueSetUri": "http://www.rfc-editor.org/bcp/bcp13.txt"
        }))
        .unwrap();
        assert!(uri.is_example());
        assert_eq!(
            uri.value_set_url(),
            Some("http://www.rfc-editor.org/bcp/bcp13.txt")
        );
    }
}
