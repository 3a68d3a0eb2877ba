//! FHIR document loader
//!
//! Discovers conformance documents on disk, keeps the categories the type-graph
//! builder understands (StructureDefinition, ValueSet, CodeSystem) and builds
//! the identifier-keyed [`DocumentMap`] it consumes.
//!
//! - StructureDefinitions are keyed by `id` and only accepted from files whose
//!   name carries the profile marker (`profiles-resources.json`, ...)
//! - ValueSets and CodeSystems are keyed by canonical `url`
//! - Files may hold a single resource or a Bundle of them

pub mod document;
pub mod error;
pub mod loader;

pub use document::{Document, DocumentCategory, DocumentMap};
pub use error::{LoadError, LoadResult};
pub use loader::{DocumentLoader, LoaderOptions};
