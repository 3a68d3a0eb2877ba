//! Code generators for different target languages
//!
//! Each language has its own module that implements the `Generator` trait.

pub mod typescript;

use crate::resolver::Resolution;
use anyhow::Result;

/// Trait that all language generators must implement
pub trait Generator {
    /// The output type of this generator
    type Output;

    /// Generate code from a resolved type graph
    fn generate(&self, resolution: &Resolution) -> Result<Self::Output>;
}

/// Configuration options for code generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Whether to generate documentation comments
    pub generate_docs: bool,
    /// Wrap all declarations in a `declare namespace` block
    pub namespace: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generate_docs: true,
            namespace: None,
        }
    }
}
