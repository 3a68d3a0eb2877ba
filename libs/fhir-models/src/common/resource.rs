//! Dispatch over the conformance resource categories

use super::code_system::CodeSystem;
use super::error::{Error, Result};
use super::structure_definition::StructureDefinition;
use super::value_set::ValueSet;
use serde_json::Value;

/// A parsed conformance resource of one of the supported categories
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    StructureDefinition(Box<StructureDefinition>),
    ValueSet(Box<ValueSet>),
    CodeSystem(Box<CodeSystem>),
}

impl Resource {
    /// Parse a JSON value by its `resourceType`.
    ///
    /// Returns `Ok(None)` for resource types outside the supported categories.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        let resource_type = value
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingField("resourceType".to_string()))?;

        let resource = match resource_type {
            "StructureDefinition" => {
                Resource::StructureDefinition(Box::new(StructureDefinition::from_value(value)?))
            }
            "ValueSet" => Resource::ValueSet(Box::new(ValueSet::from_value(value)?)),
            "CodeSystem" => Resource::CodeSystem(Box::new(CodeSystem::from_value(value)?)),
            _ => return Ok(None),
        };

        Ok(Some(resource))
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::StructureDefinition(_) => "StructureDefinition",
            Resource::ValueSet(_) => "ValueSet",
            Resource::CodeSystem(_) => "CodeSystem",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::StructureDefinition(sd) => sd.id.as_deref(),
            Resource::ValueSet(vs) => vs.id.as_deref(),
            Resource::CodeSystem(cs) => cs.id.as_deref(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Resource::StructureDefinition(sd) => sd.url.as_deref(),
            Resource::ValueSet(vs) => vs.url.as_deref(),
            Resource::CodeSystem(cs) => cs.url.as_deref(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Resource::StructureDefinition(sd) => sd.name.as_deref(),
            Resource::ValueSet(vs) => vs.name.as_deref(),
            Resource::CodeSystem(cs) => cs.name.as_deref(),
        }
    }
}

impl From<StructureDefinition> for Resource {
    fn from(sd: StructureDefinition) -> Self {
        Resource::StructureDefinition(Box::new(sd))
    }
}

impl From<ValueSet> for Resource {
    fn from(vs: ValueSet) -> Self {
        Resource::ValueSet(Box::new(vs))
    }
}

impl From<CodeSystem> for Resource {
    fn from(cs: CodeSystem) -> Self {
        Resource::CodeSystem(Box::new(cs))
    }
}
