//! Directory and bundle traversal producing a [`DocumentMap`]

use crate::document::{Document, DocumentCategory, DocumentMap};
use crate::error::{LoadError, LoadResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use typegraph_models::{Bundle, Resource};

/// Options controlling which documents are accepted
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// StructureDefinitions are only accepted from files whose name contains this marker
    pub profile_marker: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            profile_marker: "profile".to_string(),
        }
    }
}

/// Accumulates documents from files and JSON values into a [`DocumentMap`]
#[derive(Debug, Default)]
pub struct DocumentLoader {
    options: LoaderOptions,
    documents: DocumentMap,
}

impl DocumentLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            documents: DocumentMap::new(),
        }
    }

    /// Load every `*.json` file below `dir`, in sorted path order.
    pub fn load_directory(&mut self, dir: &Path) -> LoadResult<()> {
        let mut files = Vec::new();
        collect_json_files(dir, &mut files)?;
        files.sort();

        tracing::debug!(dir = %dir.display(), files = files.len(), "Loading documents");

        for path in files {
            self.load_file(&path)?;
        }
        Ok(())
    }

    /// Load a single JSON file holding a resource or a Bundle of resources.
    pub fn load_file(&mut self, path: &Path) -> LoadResult<()> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let value = parse_json(&filename, &bytes)?;
        self.load_value(&filename, &value)
    }

    /// Load an already-parsed JSON value attributed to `filename`.
    pub fn load_value(&mut self, filename: &str, value: &Value) -> LoadResult<()> {
        if Bundle::is_bundle(value) {
            let bundle = Bundle::from_value(value).map_err(|source| LoadError::Model {
                filename: filename.to_string(),
                source,
            })?;
            for resource in bundle.resources() {
                self.load_resource(filename, resource)?;
            }
            return Ok(());
        }

        self.load_resource(filename, value)
    }

    /// Finish loading and hand over the document map
    pub fn finish(self) -> DocumentMap {
        tracing::info!(documents = self.documents.len(), "Documents loaded");
        self.documents
    }

    fn load_resource(&mut self, filename: &str, value: &Value) -> LoadResult<()> {
        let Some(resource_type) = value.get("resourceType").and_then(Value::as_str) else {
            tracing::debug!(filename, "Skipping JSON without resourceType");
            return Ok(());
        };

        let resource = match Resource::from_value(value) {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                tracing::debug!(filename, resource_type, "Skipping unsupported resource type");
                return Ok(());
            }
            Err(source) => {
                return Err(LoadError::Model {
                    filename: filename.to_string(),
                    source,
                })
            }
        };

        let category = DocumentCategory::of(&resource);
        if category == DocumentCategory::StructureDefinition
            && !filename.contains(&self.options.profile_marker)
        {
            tracing::debug!(
                filename,
                id = resource.id().unwrap_or_default(),
                "Skipping StructureDefinition outside profile sources"
            );
            return Ok(());
        }

        let key = match category {
            DocumentCategory::StructureDefinition => resource.id(),
            DocumentCategory::ValueSet | DocumentCategory::CodeSystem => resource.url(),
        };
        let Some(key) = key.map(String::from) else {
            tracing::warn!(filename, resource_type, "Dropping document without identifier");
            return Ok(());
        };

        let inline_system = match &resource {
            Resource::ValueSet(vs) => vs.code_system.as_ref().and_then(|cs| cs.system.clone()),
            _ => None,
        };

        self.documents
            .insert(Document::new(key.clone(), filename, resource))?;

        if let Some(system) = inline_system {
            if !self.documents.add_alias(system.clone(), key.clone()) {
                tracing::debug!(filename, system = %system, "Inline code system URL already taken");
            }
        }

        Ok(())
    }
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> LoadResult<()> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let path = entry
            .map_err(|source| LoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension() == Some("json".as_ref()) {
            files.push(path);
        }
    }
    Ok(())
}

fn parse_json(filename: &str, bytes: &[u8]) -> LoadResult<Value> {
    let cleaned = clean_bytes(filename, bytes)?;
    serde_json::from_str(&cleaned).map_err(|source| LoadError::Json {
        filename: filename.to_string(),
        source,
    })
}

/// Strip a UTF-8 BOM and stray control characters some published packages carry
fn clean_bytes(filename: &str, bytes: &[u8]) -> LoadResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let content = std::str::from_utf8(bytes).map_err(|e| {
        LoadError::InvalidStructure(format!("{}: invalid UTF-8: {}", filename, e))
    })?;

    Ok(content
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\x7F'))
        .collect::<String>()
        .trim()
        .to_string())
}
