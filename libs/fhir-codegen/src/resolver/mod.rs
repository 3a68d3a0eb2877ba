//! Resolution driver
//!
//! Walks the loaded documents starting from every concrete resource
//! definition and pulls in whatever they reference: base types, element
//! types, sub-types and bound value sets. Each document is visited at most
//! once; the types it produces are published to the registry the first time
//! another document (or the seed loop) references it.

mod naming;
mod structure;
mod terminology;

pub use naming::{format_identifier, NameAllocator};

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::ir::{TypeId, TypeNode, TypeRegistry};
use typegraph_loader::{Document, DocumentMap};
use typegraph_models::Resource;

/// Progress of a single document through resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitStatus {
    #[default]
    Unvisited,
    /// Being processed; re-entry yields no result
    Queued,
    Processed,
}

/// Per-document resolution bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitState {
    pub status: VisitStatus,
    /// Set once the document's type has been published to the registry
    pub referenced: bool,
    pub resolved: Option<TypeId>,
    /// Name of the resolved type
    pub symbol: Option<String>,
}

/// Outcome of a resolution run
#[derive(Debug, Clone)]
pub struct Resolution {
    registry: TypeRegistry,
    visits: Vec<(String, VisitState)>,
    errors: Vec<String>,
}

impl Resolution {
    /// Published types in first-visitation order
    pub fn types(&self) -> impl Iterator<Item = &TypeNode> {
        self.registry.ordered()
    }

    pub fn get(&self, name: &str) -> Option<&TypeNode> {
        self.registry.get_by_name(name)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Error messages, each prefixed with the offending document's filename
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn visit_state(&self, id: &str) -> Option<&VisitState> {
        self.visits
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, state)| state)
    }
}

/// Resolve every concrete resource definition in `documents` into a type graph
pub fn resolve(documents: &DocumentMap, config: &ResolverConfig) -> Resolution {
    let mut resolver = Resolver::new(documents, config);
    resolver.run();
    resolver.finish()
}

pub(crate) struct Resolver<'a> {
    documents: &'a DocumentMap,
    config: &'a ResolverConfig,
    allocator: NameAllocator,
    states: Vec<VisitState>,
    registry: TypeRegistry,
    errors: Vec<String>,
    /// Index of the document errors are attributed to
    current: Option<usize>,
}

impl<'a> Resolver<'a> {
    fn new(documents: &'a DocumentMap, config: &'a ResolverConfig) -> Self {
        Self {
            documents,
            config,
            allocator: NameAllocator::new(config.max_member_name_length),
            states: vec![VisitState::default(); documents.len()],
            registry: TypeRegistry::new(),
            errors: Vec::new(),
            current: None,
        }
    }

    fn run(&mut self) {
        let documents = self.documents;
        for (index, document) in documents.iter().enumerate() {
            let Some(sd) = document.structure_definition() else {
                continue;
            };
            if !sd.is_resource() {
                continue;
            }
            if sd.is_constraint() {
                tracing::warn!(
                    id = %document.id,
                    filename = %document.filename,
                    "Skipping constraint profile"
                );
                continue;
            }
            self.reference_file(index);
        }
    }

    fn finish(self) -> Resolution {
        tracing::info!(
            types = self.registry.len(),
            errors = self.errors.len(),
            "Resolution finished"
        );
        let visits = self
            .documents
            .iter()
            .map(|document| document.id.clone())
            .zip(self.states)
            .collect();
        Resolution {
            registry: self.registry,
            visits,
            errors: self.errors,
        }
    }

    fn document(&self, index: usize) -> Option<&'a Document> {
        let documents = self.documents;
        documents.get_index(index)
    }

    /// Record an error against the document currently being visited
    fn report(&mut self, error: ResolveError) {
        let filename = self
            .current
            .and_then(|index| self.document(index))
            .map(|document| document.filename.as_str());
        self.report_in(filename, error);
    }

    fn report_in(&mut self, filename: Option<&str>, error: ResolveError) {
        let message = match filename {
            Some(filename) => format!("{filename}: {error}"),
            None => error.to_string(),
        };
        tracing::warn!("{}", message);
        self.errors.push(message);
    }

    /// Resolve a document and publish its type, once
    fn reference_file(&mut self, index: usize) -> Option<TypeId> {
        if self.states[index].referenced {
            return self.states[index].resolved;
        }
        self.states[index].referenced = true;

        let id = self.process_file(index)?;
        if !self.registry.register(id) {
            let name = self.registry.get(id).name().unwrap_or_default().to_string();
            let filename = self.document(index).map(|document| document.filename.as_str());
            self.report_in(filename, ResolveError::DuplicateTypeName(name));
        }
        Some(id)
    }

    /// Build a document's type without publishing it
    fn process_file(&mut self, index: usize) -> Option<TypeId> {
        match self.states[index].status {
            VisitStatus::Processed => return self.states[index].resolved,
            VisitStatus::Queued => return None,
            VisitStatus::Unvisited => {}
        }
        let document = self.document(index)?;
        let content = document.content.as_ref()?;

        self.states[index].status = VisitStatus::Queued;
        let previous = self.current.replace(index);
        tracing::debug!(id = %document.id, category = %document.category, "Visiting document");

        let result = match content {
            Resource::StructureDefinition(sd) => self.build_structure(document, sd),
            Resource::ValueSet(vs) => self.build_value_set(document, vs),
            Resource::CodeSystem(cs) => self.build_code_system(document, cs),
        };
        let resolved = match result {
            Ok(id) => Some(id),
            Err(error) => {
                self.report(error);
                None
            }
        };

        self.current = previous;
        let state = &mut self.states[index];
        state.status = VisitStatus::Processed;
        state.resolved = resolved;
        state.symbol = resolved.and_then(|id| self.registry.get(id).name().map(String::from));
        resolved
    }
}
