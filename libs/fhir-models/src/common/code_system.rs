//! FHIR CodeSystem model
//!
//! Version-tolerant model for CodeSystems (terminology)

use super::error::{Error, Result};
use super::extension::{find_string_extension, Extension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR CodeSystem resource
///
/// Declares the existence of and describes a code system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystem {
    /// Resource type - always "CodeSystem"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Name (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Name (human friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// If code comparison is case sensitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Hierarchy meaning (grouped-by | is-a | part-of | classified-with)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy_meaning: Option<String>,

    /// Concepts in the code system
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<CodeSystemConcept>,

    /// Additional content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "CodeSystem".to_string()
}

/// Concept in a code system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CodeSystemConcept {
    /// Code that identifies the concept
    #[serde(default)]
    pub code: String,

    /// Text to display to the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Extensions on the concept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    /// Child concepts (nested hierarchy)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<CodeSystemConcept>,
}

impl CodeSystemConcept {
    pub fn new(code: impl Into<String>, display: Option<&str>) -> Self {
        Self {
            code: code.into(),
            display: display.map(String::from),
            ..Default::default()
        }
    }

    /// Definition text, falling back to a `*-definition` extension
    pub fn definition_text(&self) -> Option<&str> {
        self.definition
            .as_deref()
            .or_else(|| find_string_extension(&self.extension, "-definition"))
    }
}

impl CodeSystem {
    /// Create a new CodeSystem with a canonical URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            resource_type: "CodeSystem".to_string(),
            id: None,
            url: Some(url.into()),
            name: None,
            title: None,
            description: None,
            case_sensitive: None,
            hierarchy_meaning: None,
            concept: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_concepts() {
        let cs = CodeSystem::from_value(&json!({
            "resourceType": "CodeSystem",
            "url": "http://hl7.org/fhir/observation-status",
            "caseSensitive": true,
            "concept": [
                {
                    "code": "final",
                    "display": "Final",
                    "concept": [{ "code": "amended", "display": "Amended" }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(cs.case_sensitive, Some(true));
        assert_eq!(cs.concept.len(), 1);
        assert_eq!(cs.concept[0].concept[0].code, "amended");
    }

    #[test]
    fn test_definition_text_falls_back_to_extension() {
        let concept = CodeSystemConcept {
            code: "x".into(),
            extension: vec![Extension::string(
                "http://hl7.org/fhir/StructureDefinition/valueset-definition",
                "From extension",
            )],
            ..Default::default()
        };
        assert_eq!(concept.definition_text(), Some("From extension"));

        let explicit = CodeSystemConcept {
            definition: Some("Explicit".into()),
            ..concept
        };
        assert_eq!(explicit.definition_text(), Some("Explicit"));
    }
}
