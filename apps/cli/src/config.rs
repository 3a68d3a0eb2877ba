//! Layered configuration: defaults, optional TOML file, `TYPEGRAPH__*` environment, flags

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use typegraph_codegen::generators::GeneratorConfig;
use typegraph_codegen::ResolverConfig;

/// Looked up in the working directory when no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "typegraph.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub resolver: ResolverConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub generate_docs: bool,
    pub namespace: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            generate_docs: true,
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CliConfig {
    /// Merge the configuration file (if any) and environment overrides over defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // e.g. TYPEGRAPH__RESOLVER__LEGACY_SHIMS=false
        builder = builder.add_source(
            Environment::with_prefix("TYPEGRAPH")
                .try_parsing(true)
                .separator("__"),
        );

        builder
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("reading configuration")
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            generate_docs: self.output.generate_docs,
            namespace: self.output.namespace.clone(),
        }
    }
}
