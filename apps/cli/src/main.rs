//! typegraph - FHIR definitions to TypeScript declarations
//!
//! Loads every structure definition, value set and code system below a
//! directory, resolves them into a type graph and writes `index.d.ts`.
//! Resolution problems are logged and turn the exit status into a failure,
//! but declarations are still written for everything that resolved.

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use typegraph_codegen::generators::typescript::TypeScriptGenerator;
use typegraph_codegen::{utils, CodeGenerator};
use typegraph_loader::{DocumentLoader, LoaderOptions};

use crate::config::CliConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "typegraph", version, about)]
struct Args {
    /// Directory containing FHIR definition files (searched recursively)
    source_dir: PathBuf,

    /// Directory the declarations are written to
    #[arg(short, long)]
    out_dir: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "TYPEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Omit documentation comments
    #[arg(long)]
    no_docs: bool,

    /// Wrap declarations in `declare namespace <NAME>`
    #[arg(long)]
    namespace: Option<String>,

    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Flags are the last configuration layer
    fn apply(&self, config: &mut CliConfig) {
        if self.no_docs {
            config.output.generate_docs = false;
        }
        if let Some(namespace) = &self.namespace {
            config.output.namespace = Some(namespace.clone());
        }
        if let Some(format) = self.log_format {
            config.logging.json = format == LogFormat::Json;
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let mut config = CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        source = %args.source_dir.display(),
        "Loading definitions"
    );

    let mut loader = DocumentLoader::new(LoaderOptions::default());
    loader
        .load_directory(&args.source_dir)
        .with_context(|| format!("Failed to load {}", args.source_dir.display()))?;
    let documents = loader.finish();

    let codegen = CodeGenerator::from_documents(&documents, &config.resolver);
    let resolution = codegen.resolution();
    for error in resolution.errors() {
        tracing::error!("{}", error);
    }

    let output = codegen
        .generate(TypeScriptGenerator::new(config.generator_config()))
        .context("Failed to render TypeScript")?;
    utils::write_modules(&args.out_dir, &output.modules)?;

    tracing::info!(
        types = resolution.types().count(),
        errors = resolution.errors().len(),
        out = %args.out_dir.display(),
        "Generation complete"
    );

    if resolution.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
