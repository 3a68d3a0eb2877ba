//! FHIR conformance document models
//!
//! Strongly-typed, lenient Rust structures for the three document categories
//! the type-graph builder consumes: StructureDefinitions, ValueSets and
//! CodeSystems.
//!
//! # Design Philosophy
//!
//! - **Version-tolerant**: fields that moved or were renamed between DSTU2,
//!   STU3 and R4 are accepted under every historical spelling
//! - **Lenient**: almost every field is optional; unknown fields are kept in
//!   an `extensions` map instead of failing deserialization
//! - **Compatible**: `Resource::from_value` works directly on `serde_json::Value`
//!
//! # Example
//!
//! ```rust
//! use typegraph_models::{Resource, StructureDefinitionKind};
//! use serde_json::json;
//!
//! let value = json!({
//!     "resourceType": "StructureDefinition",
//!     "id": "Patient",
//!     "url": "http://hl7.org/fhir/StructureDefinition/Patient",
//!     "name": "Patient",
//!     "kind": "resource",
//!     "abstract": false
//! });
//!
//! let Some(Resource::StructureDefinition(sd)) = Resource::from_value(&value).unwrap() else {
//!     panic!("expected a StructureDefinition");
//! };
//! assert_eq!(sd.id.as_deref(), Some("Patient"));
//! assert_eq!(sd.kind, Some(StructureDefinitionKind::Resource));
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
