//! Documents and the identifier-keyed document map

use crate::error::{LoadError, LoadResult};
use indexmap::IndexMap;
use std::collections::HashMap;
use typegraph_models::{Resource, StructureDefinition};

/// Declared category of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentCategory {
    StructureDefinition,
    ValueSet,
    CodeSystem,
}

impl DocumentCategory {
    pub fn of(resource: &Resource) -> Self {
        match resource {
            Resource::StructureDefinition(_) => DocumentCategory::StructureDefinition,
            Resource::ValueSet(_) => DocumentCategory::ValueSet,
            Resource::CodeSystem(_) => DocumentCategory::CodeSystem,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::StructureDefinition => "StructureDefinition",
            DocumentCategory::ValueSet => "ValueSet",
            DocumentCategory::CodeSystem => "CodeSystem",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed schema document together with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Resource id (StructureDefinition) or canonical URL (ValueSet, CodeSystem)
    pub id: String,
    /// File the document was read from
    pub filename: String,
    pub category: DocumentCategory,
    /// Parsed content; `None` when the loader kept the entry without content
    pub content: Option<Resource>,
}

impl Document {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, resource: Resource) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            category: DocumentCategory::of(&resource),
            content: Some(resource),
        }
    }

    /// A document entry that carries no parsed content
    pub fn empty(
        id: impl Into<String>,
        filename: impl Into<String>,
        category: DocumentCategory,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            category,
            content: None,
        }
    }

    pub fn structure_definition(&self) -> Option<&StructureDefinition> {
        match &self.content {
            Some(Resource::StructureDefinition(sd)) => Some(sd.as_ref()),
            _ => None,
        }
    }
}

/// Identifier-keyed collection of documents.
///
/// Keys are case-sensitive and unique; iteration follows insertion order.
/// Secondary canonical URLs (DSTU2 inline code systems) resolve through an
/// alias table to the key of the document that defines them.
#[derive(Debug, Clone, Default)]
pub struct DocumentMap {
    documents: IndexMap<String, Document>,
    aliases: HashMap<String, String>,
}

impl DocumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under its id, returning its index.
    pub fn insert(&mut self, document: Document) -> LoadResult<usize> {
        if let Some(existing) = self.documents.get(&document.id) {
            return Err(LoadError::DuplicateIdentifier {
                id: document.id.clone(),
                filename: document.filename.clone(),
                first_filename: existing.filename.clone(),
            });
        }

        let (index, _) = self.documents.insert_full(document.id.clone(), document);
        Ok(index)
    }

    /// Register `alias` as another name for the document keyed `key`.
    ///
    /// Returns `false` when the alias is already taken by a key or an earlier alias.
    pub fn add_alias(&mut self, alias: impl Into<String>, key: impl Into<String>) -> bool {
        let alias = alias.into();
        if self.documents.contains_key(&alias) || self.aliases.contains_key(&alias) {
            return false;
        }
        self.aliases.insert(alias, key.into());
        true
    }

    /// Look up a document by key, falling back to the alias table
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.get_index_of(key).and_then(|i| self.get_index(i))
    }

    /// Index of a document by key, falling back to the alias table
    pub fn get_index_of(&self, key: &str) -> Option<usize> {
        self.documents.get_index_of(key).or_else(|| {
            self.aliases
                .get(key)
                .and_then(|primary| self.documents.get_index_of(primary))
        })
    }

    pub fn get_index(&self, index: usize) -> Option<&Document> {
        self.documents.get_index(index).map(|(_, doc)| doc)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_index_of(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
