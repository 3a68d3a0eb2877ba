//! FHIR Type Graph Builder
//!
//! Resolves a batch of FHIR conformance documents (structure definitions,
//! value sets, code systems) into an ordered graph of named types and renders
//! that graph as code.
//!
//! ## Architecture
//!
//! The builder uses a three-stage pipeline:
//! 1. **Loader** (`typegraph-loader`): reads documents into an identifier-keyed map
//! 2. **Resolver**: visits documents on demand and builds the IR, collecting
//!    every problem as a filename-prefixed error instead of stopping
//! 3. **Generators**: language-specific rendering of the resolved types
//!
//! ```
//! use typegraph_codegen::{resolve, ResolverConfig};
//! use typegraph_loader::DocumentMap;
//!
//! let resolution = resolve(&DocumentMap::new(), &ResolverConfig::default());
//! assert_eq!(resolution.types().count(), 0);
//! assert!(!resolution.has_errors());
//! ```

pub mod config;
pub mod error;
pub mod generators;
pub mod ir;
pub mod resolver;
pub mod utils;

pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use resolver::{resolve, Resolution, VisitState, VisitStatus};

use std::path::Path;

use anyhow::{Context, Result};
use generators::typescript::TypeScriptGenerator;
use generators::GeneratorConfig;
use typegraph_loader::{DocumentLoader, DocumentMap, LoaderOptions};

/// Main entry point for code generation
pub struct CodeGenerator {
    resolution: Resolution,
}

impl CodeGenerator {
    /// Resolve a loaded document map
    pub fn from_documents(documents: &DocumentMap, config: &ResolverConfig) -> Self {
        Self {
            resolution: resolve(documents, config),
        }
    }

    /// Get the resolved type graph
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Generate code for a specific language
    pub fn generate<G: generators::Generator>(&self, generator: G) -> Result<G::Output> {
        generator.generate(&self.resolution)
    }
}

/// What a generation run produced
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub modules: usize,
    pub types: usize,
    /// Resolution errors; generation still ran
    pub errors: Vec<String>,
}

/// Convenience helper: load a directory, resolve it and write TypeScript declarations.
pub fn generate_typescript_from_directory(
    source_dir: &Path,
    output_dir: &Path,
    resolver_config: &ResolverConfig,
    generator_config: GeneratorConfig,
) -> Result<GenerationSummary> {
    let mut loader = DocumentLoader::new(LoaderOptions::default());
    loader
        .load_directory(source_dir)
        .with_context(|| format!("loading documents from {}", source_dir.display()))?;
    let documents = loader.finish();

    let codegen = CodeGenerator::from_documents(&documents, resolver_config);
    let output = codegen
        .generate(TypeScriptGenerator::new(generator_config))
        .context("running TypeScript generator")?;

    utils::write_modules(output_dir, &output.modules)?;

    let resolution = codegen.resolution();
    Ok(GenerationSummary {
        modules: output.modules.len(),
        types: resolution.types().count(),
        errors: resolution.errors().to_vec(),
    })
}
