//! Version-tolerant FHIR conformance models
//!
//! Types that accept DSTU2, STU3 and R4 spellings of the same content

pub mod bundle;
pub mod code_system;
pub mod element_definition;
pub mod error;
pub mod extension;
pub mod resource;
pub mod structure_definition;
pub mod value_set;

// Re-export commonly used types
pub use bundle::*;
pub use code_system::*;
pub use element_definition::*;
pub use error::{Error, Result};
pub use extension::*;
pub use resource::*;
pub use structure_definition::*;
pub use value_set::*;
