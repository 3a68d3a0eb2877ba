//! FHIR StructureDefinition model
//!
//! Covers the DSTU2 (`base`, `constrainedType`) and STU3+ (`baseDefinition`,
//! `derivation`) spellings of inheritance.

use super::element_definition::{Differential, ElementDefinition, Snapshot};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR StructureDefinition resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Resource type - always "StructureDefinition"
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

    /// Natural language description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// primitive-type | complex-type | resource | logical (datatype in DSTU2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<StructureDefinitionKind>,

    /// Whether the structure is abstract
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    /// Definition that this type is constrained/specialized from
    #[serde(alias = "base", skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    /// specialization | constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    /// DSTU2: any value marks the structure as a constraint on that type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constrained_type: Option<String>,

    /// Type defined or constrained by this structure
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Snapshot view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    /// Differential view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    /// Additional content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

/// Kind of structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    PrimitiveType,
    ComplexType,
    Datatype,
    Resource,
    Logical,
    #[serde(other)]
    Other,
}

/// How a type relates to its base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    Specialization,
    Constraint,
}

impl StructureDefinition {
    /// Create a new StructureDefinition with an id and kind
    pub fn new(id: impl Into<String>, kind: StructureDefinitionKind) -> Self {
        Self {
            resource_type: "StructureDefinition".to_string(),
            id: Some(id.into()),
            url: None,
            name: None,
            description: None,
            kind: Some(kind),
            is_abstract: None,
            base_definition: None,
            derivation: None,
            constrained_type: None,
            type_: None,
            snapshot: None,
            differential: None,
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Whether this structure describes a resource (as opposed to a data type)
    pub fn is_resource(&self) -> bool {
        self.kind == Some(StructureDefinitionKind::Resource)
    }

    /// Whether this structure only constrains another type (a profile)
    pub fn is_constraint(&self) -> bool {
        self.derivation == Some(TypeDerivationRule::Constraint) || self.constrained_type.is_some()
    }

    /// Differential elements in document order
    pub fn differential_elements(&self) -> &[ElementDefinition] {
        self.differential
            .as_ref()
            .map(|d| d.element.as_slice())
            .unwrap_or(&[])
    }

    /// The first differential element whose path has no dot
    pub fn root_element(&self) -> Option<&ElementDefinition> {
        self.differential_elements().iter().find(|e| e.is_root())
    }
}
