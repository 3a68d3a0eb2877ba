//! TypeScript declaration generator

mod types;

use crate::generators::{Generator, GeneratorConfig};
use crate::ir::TypeKind;
use crate::resolver::Resolution;
use anyhow::{bail, Result};
use std::collections::BTreeMap;

pub use types::render_type;

/// Name of the single declaration module produced
pub const MODULE_NAME: &str = "index.d.ts";

/// Output of the TypeScript generator
#[derive(Debug)]
pub struct TypeScriptOutput {
    /// Generated modules indexed by file name
    pub modules: BTreeMap<String, String>,
}

/// TypeScript code generator
pub struct TypeScriptGenerator {
    config: GeneratorConfig,
}

impl TypeScriptGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl Generator for TypeScriptGenerator {
    type Output = TypeScriptOutput;

    fn generate(&self, resolution: &Resolution) -> Result<Self::Output> {
        let mut declarations = Vec::new();
        for node in resolution.types() {
            // Primitives are never declared; uses map onto intrinsics.
            let block = match &node.kind {
                TypeKind::Interface(interface) => {
                    types::generate_interface(interface, resolution, &self.config)
                }
                TypeKind::Enum(enumeration) => types::generate_enum(enumeration, &self.config),
                _ => continue,
            };
            declarations.push(block);
        }

        let body = declarations.join("\n\n");
        let code = match &self.config.namespace {
            Some(namespace) => {
                if !types::is_identifier(namespace) {
                    bail!("namespace '{namespace}' is not a valid identifier");
                }
                format!(
                    "declare namespace {namespace} {{\n{}\n}}\n",
                    types::indent(&body, 1)
                )
            }
            None => format!("{body}\n"),
        };

        let mut modules = BTreeMap::new();
        modules.insert(
            MODULE_NAME.to_string(),
            format!("// Generated type declarations. Do not edit.\n\n{code}"),
        );

        tracing::debug!(declarations = declarations.len(), "Rendered TypeScript declarations");
        Ok(TypeScriptOutput { modules })
    }
}
