//! FHIR ValueSet model
//!
//! Version-tolerant model for ValueSets (terminology), including the DSTU2
//! inline `codeSystem` block and the legacy `compose.import` list.

use super::code_system::CodeSystemConcept;
use super::error::{Error, Result};
use super::extension::{find_string_extension, Extension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR ValueSet resource
///
/// A set of codes drawn from one or more code systems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSet {
    /// Resource type - always "ValueSet"
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

    /// DSTU2: code system defined inline with the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system: Option<ValueSetCodeSystem>,

    /// Content logical definition (the "intension")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose: Option<ValueSetCompose>,

    /// Additional content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "ValueSet".to_string()
}

/// Inline code system (DSTU2)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetCodeSystem {
    /// URI to identify the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// If code comparison is case sensitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Concepts in the code system
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<CodeSystemConcept>,
}

/// Content logical definition of the value set (intension)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetCompose {
    /// Value sets whose contents are imported (DSTU2/STU3)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub import: Vec<String>,

    /// Include one or more codes from a code system or other value set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<ValueSetInclude>,

    /// Explicitly exclude codes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ValueSetInclude>,
}

/// Include codes from a code system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetInclude {
    /// The system the codes come from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Specific version of the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Specific codes from the system
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<ValueSetConcept>,

    /// Select codes/concepts by their properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<ValueSetFilter>,

    /// Select only contents included in specified value set(s)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_set: Vec<String>,
}

/// A concept listed directly in an include
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValueSetConcept {
    /// Code from the system
    #[serde(default)]
    pub code: String,

    /// Text to display for this code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Definition carried inline (non-standard but common in older packages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Extensions on the concept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl ValueSetConcept {
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

/// Select codes by property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValueSetFilter {
    /// Property name
    #[serde(default)]
    pub property: String,

    /// Filter operator (= | is-a | descendent-of | is-not-a | regex | in | not-in | generalizes | exists)
    #[serde(default)]
    pub op: String,

    /// Value of the filter
    #[serde(default)]
    pub value: String,
}

impl ValueSet {
    /// Create a new ValueSet with a canonical URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            resource_type: "ValueSet".to_string(),
            id: None,
            url: Some(url.into()),
            name: None,
            title: None,
            description: None,
            code_system: None,
            compose: None,
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Include entries in document order
    pub fn includes(&self) -> &[ValueSetInclude] {
        self.compose
            .as_ref()
            .map(|c| c.include.as_slice())
            .unwrap_or(&[])
    }

    /// Legacy `compose.import` entries in document order
    pub fn imports(&self) -> &[String] {
        self.compose
            .as_ref()
            .map(|c| c.import.as_slice())
            .unwrap_or(&[])
    }
}
