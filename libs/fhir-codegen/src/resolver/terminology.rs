//! Value sets and code systems to enumerated types

use super::{format_identifier, NameAllocator, Resolver, VisitStatus};
use crate::error::{ResolveError, ResolveResult};
use crate::ir::{EnumMember, TypeCategory, TypeId, TypeKind, TypeNode, EnumType};
use typegraph_loader::Document;
use typegraph_models::{CodeSystem, CodeSystemConcept, ValueSet, ValueSetInclude};

/// Upper-camel document name, else the last segment of its identifier
fn enum_name(name: Option<&str>, id: &str) -> String {
    name.and_then(format_identifier)
        .or_else(|| id.rsplit('/').next().and_then(format_identifier))
        .unwrap_or_else(|| id.to_string())
}

fn enum_node(
    name: String,
    category: TypeCategory,
    description: Option<String>,
    members: Vec<EnumMember>,
) -> TypeNode {
    TypeNode {
        category,
        kind: TypeKind::Enum(EnumType {
            name,
            description,
            members,
        }),
    }
}

fn concept_member(
    allocator: NameAllocator,
    code: &str,
    display: Option<&str>,
    definition: Option<&str>,
    system: Option<&str>,
    case_sensitive: Option<bool>,
) -> EnumMember {
    let mut member = EnumMember::new(code);
    member.display = display.map(String::from);
    member.description = definition.map(String::from).or_else(|| {
        display
            .map(str::trim)
            .filter(|d| d.contains(char::is_whitespace))
            .map(String::from)
    });
    member.system = system.map(String::from);
    member.case_sensitive = case_sensitive;
    member.name = allocator.primary_name(&member);
    member
}

/// Depth-first, parents before children; children point back at their parent's index
fn flatten_concepts(
    allocator: NameAllocator,
    concepts: &[CodeSystemConcept],
    system: Option<&str>,
    case_sensitive: Option<bool>,
    parent: Option<usize>,
    members: &mut Vec<EnumMember>,
) {
    for concept in concepts {
        let mut member = concept_member(
            allocator,
            &concept.code,
            concept.display.as_deref(),
            concept.definition_text(),
            system,
            case_sensitive,
        );
        member.parent = parent;
        let index = allocator.insert(members, member);
        flatten_concepts(
            allocator,
            &concept.concept,
            system,
            case_sensitive,
            Some(index),
            members,
        );
    }
}

/// Whether `members[index]` is `code` or sits below it
fn is_a(members: &[EnumMember], index: usize, code: &str) -> bool {
    let mut next = Some(index);
    let mut steps = 0;
    while let Some(i) = next {
        let Some(member) = members.get(i) else {
            return false;
        };
        if member.matches_code(code) {
            return true;
        }
        steps += 1;
        if steps > members.len() {
            return false;
        }
        next = member.parent;
    }
    false
}

fn descendants(members: &[EnumMember], code: &str) -> Vec<EnumMember> {
    (0..members.len())
        .filter(|&index| is_a(members, index, code))
        .map(|index| members[index].detached())
        .collect()
}

/// What a lookup of another terminology document produced
enum Members {
    Resolved(Vec<EnumMember>),
    /// Still being built further up the visit stack
    InProgress,
    Missing,
}

impl<'a> Resolver<'a> {
    pub(super) fn build_code_system(
        &mut self,
        document: &'a Document,
        cs: &'a CodeSystem,
    ) -> ResolveResult<TypeId> {
        let system = cs.url.as_deref().unwrap_or(&document.id);
        let mut members = Vec::new();
        flatten_concepts(
            self.allocator,
            &cs.concept,
            Some(system),
            cs.case_sensitive,
            None,
            &mut members,
        );

        let node = enum_node(
            enum_name(cs.name.as_deref(), &document.id),
            TypeCategory::CodeSystem,
            cs.description.clone(),
            members,
        );
        Ok(self.registry.allocate(node))
    }

    pub(super) fn build_value_set(
        &mut self,
        document: &'a Document,
        vs: &'a ValueSet,
    ) -> ResolveResult<TypeId> {
        let allocator = self.allocator;
        let mut members = Vec::new();

        if let Some(inline) = &vs.code_system {
            flatten_concepts(
                allocator,
                &inline.concept,
                inline.system.as_deref(),
                inline.case_sensitive,
                None,
                &mut members,
            );
        }

        for url in vs.imports() {
            self.merge_value_set(url, &mut members);
        }

        for include in vs.includes() {
            match include.system.as_deref() {
                Some(system) => {
                    for member in self.gather_system(include, system) {
                        allocator.insert(&mut members, member);
                    }
                }
                None => {
                    for url in &include.value_set {
                        self.merge_value_set(url, &mut members);
                    }
                }
            }
        }

        let node = enum_node(
            enum_name(vs.name.as_deref(), &document.id),
            TypeCategory::ValueSet,
            vs.description.clone(),
            members,
        );
        Ok(self.registry.allocate(node))
    }

    /// Locate a terminology document by canonical URL
    pub(super) fn find_value_set(&self, url: &str) -> Option<usize> {
        let config = self.config;
        let documents = self.documents;
        let url = config.rewrite_url(url);
        let url = url.split_once('|').map_or(url, |(canonical, _)| canonical);

        documents.get_index_of(url).or_else(|| {
            let (head, last) = url.rsplit_once('/')?;
            documents.get_index_of(&format!("{head}/vs/{last}"))
        })
    }

    /// Name of the enumerated type a binding points at, publishing it
    pub(super) fn resolve_binding(&mut self, url: &str) -> ResolveResult<String> {
        let index = self
            .find_value_set(url)
            .ok_or_else(|| ResolveError::UnresolvedValueSet(url.to_string()))?;
        let id = self
            .reference_file(index)
            .ok_or_else(|| ResolveError::InvalidBinding(url.to_string()))?;
        let node = self.registry.get(id);
        match node.name() {
            Some(name) if node.category.is_terminology() => Ok(name.to_string()),
            _ => Err(ResolveError::InvalidBinding(url.to_string())),
        }
    }

    /// Members of another terminology document, without visiting it twice
    fn terminology_members(&mut self, url: &str) -> Members {
        let Some(index) = self.find_value_set(url) else {
            return Members::Missing;
        };
        let Some(id) = self.process_file(index) else {
            return if self.states[index].status == VisitStatus::Queued {
                Members::InProgress
            } else {
                Members::Missing
            };
        };
        match self.registry.get(id).as_enum() {
            Some(enumeration) => Members::Resolved(enumeration.members.clone()),
            None => Members::Missing,
        }
    }

    fn merge_value_set(&mut self, url: &str, members: &mut Vec<EnumMember>) {
        match self.terminology_members(url) {
            Members::Resolved(incoming) => {
                for member in &incoming {
                    self.allocator.insert(members, member.detached());
                }
            }
            Members::InProgress => {
                tracing::debug!(url, "Value set reference loops back; skipping");
            }
            Members::Missing => self.report(ResolveError::UnresolvedValueSet(url.to_string())),
        }
    }

    /// Concepts an include entry selects from one code system
    fn gather_system(&mut self, include: &ValueSetInclude, system: &str) -> Vec<EnumMember> {
        let allocator = self.allocator;
        let mut gathered: Vec<EnumMember> = include
            .concept
            .iter()
            .map(|concept| {
                concept_member(
                    allocator,
                    &concept.code,
                    concept.display.as_deref(),
                    concept.definition_text(),
                    Some(system),
                    Some(true),
                )
            })
            .collect();

        let lookup = self.terminology_members(system);
        let in_progress = matches!(lookup, Members::InProgress);
        let resolved = match lookup {
            Members::Resolved(system_members) => Some(system_members),
            Members::InProgress | Members::Missing => None,
        };
        if let Some(system_members) = &resolved {
            if !gathered.is_empty() {
                gathered = gathered
                    .into_iter()
                    .filter_map(|member| {
                        let known = system_members
                            .iter()
                            .find(|candidate| candidate.matches_code(&member.value))?;
                        Some(complete_from(allocator, member, known))
                    })
                    .collect();
            } else if include.filter.is_empty() {
                gathered = system_members.iter().map(EnumMember::detached).collect();
            }
        }

        for filter in &include.filter {
            if filter.property != "concept" || filter.op != "is-a" {
                self.report(ResolveError::UnsupportedFilter {
                    property: filter.property.clone(),
                    op: filter.op.clone(),
                });
                continue;
            }
            let Some(system_members) = &resolved else {
                if !in_progress {
                    self.report(ResolveError::UnresolvedCodeSystem(system.to_string()));
                }
                continue;
            };
            gathered.extend(descendants(system_members, &filter.value));
        }

        gathered
    }
}

/// Fill what an inline concept left out from the code system's own entry
fn complete_from(allocator: NameAllocator, mut member: EnumMember, known: &EnumMember) -> EnumMember {
    member.case_sensitive = known.case_sensitive.or(member.case_sensitive);
    if member.display.is_some() && member.description.is_some() {
        return member;
    }
    if member.display.is_none() {
        member.display = known.display.clone();
    }
    if member.description.is_none() {
        member.description = known.description.clone();
    }
    member.name = allocator.primary_name(&member);
    member
}
