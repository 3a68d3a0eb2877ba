//! Error types for document loading

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {filename}: {source}")]
    Json {
        filename: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid document in {filename}: {source}")]
    Model {
        filename: String,
        #[source]
        source: typegraph_models::Error,
    },

    #[error("Duplicate document identifier '{id}' in {filename} (first seen in {first_filename})")]
    DuplicateIdentifier {
        id: String,
        filename: String,
        first_filename: String,
    },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
