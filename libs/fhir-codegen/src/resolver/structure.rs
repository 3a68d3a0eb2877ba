//! Structure definitions to primitive and interface types

use super::{Resolver, VisitStatus};
use crate::error::{ResolveError, ResolveResult};
use crate::ir::{Intrinsic, Property, TypeCategory, TypeId, TypeKind, TypeNode};
use heck::ToUpperCamelCase;
use std::collections::HashSet;
use typegraph_loader::Document;
use typegraph_models::{ElementDefinition, Resource, StructureDefinition};

/// Type codes that introduce an inline sub-type
const SUBTYPE_BASES: [&str; 2] = ["Element", "BackboneElement"];

/// Concrete types substituted for the `*` wildcard, in this order
const OPEN_TYPES: [&str; 25] = [
    "integer",
    "decimal",
    "dateTime",
    "date",
    "instant",
    "time",
    "string",
    "uri",
    "boolean",
    "code",
    "base64Binary",
    "Coding",
    "CodeableConcept",
    "Attachment",
    "Identifier",
    "Quantity",
    "Range",
    "Period",
    "Ratio",
    "HumanName",
    "Address",
    "ContactPoint",
    "Timing",
    "Signature",
    "Reference",
];

const FHIRPATH_SYSTEM_PREFIX: &str = "http://hl7.org/fhirpath/System.";

fn primitive_intrinsic(name: &str) -> Option<Intrinsic> {
    match name {
        "boolean" => Some(Intrinsic::Boolean),
        "integer" | "decimal" | "unsignedInt" | "positiveInt" => Some(Intrinsic::Number),
        "string" | "code" | "id" | "markdown" | "uri" | "oid" | "uuid" | "date" | "dateTime"
        | "instant" | "time" | "base64Binary" | "xhtml" => Some(Intrinsic::String),
        _ => None,
    }
}

/// R4 declares some element types as FHIRPath system types; map them onto primitives
fn normalize_type_code(code: &str) -> &str {
    match code.strip_prefix(FHIRPATH_SYSTEM_PREFIX) {
        Some("String") => "string",
        Some("Boolean") => "boolean",
        Some("Integer") => "integer",
        Some("Decimal") => "decimal",
        Some("Date") => "date",
        Some("DateTime") => "dateTime",
        Some("Time") => "time",
        _ => code,
    }
}

fn expand_type_codes(element: &ElementDefinition) -> Vec<String> {
    let mut codes = Vec::new();
    for code in element.type_codes() {
        if code == "*" {
            codes.extend(OPEN_TYPES.iter().map(|c| c.to_string()));
        } else {
            codes.push(normalize_type_code(&code).to_string());
        }
    }
    codes
}

/// Primitive when the root element's short text says so, else resource or data type
fn structure_category(sd: &StructureDefinition) -> TypeCategory {
    let primitive = sd
        .root_element()
        .and_then(|element| element.short.as_deref())
        .is_some_and(|short| short.contains("Primitive"));
    if primitive {
        TypeCategory::Primitive
    } else if sd.is_resource() {
        TypeCategory::Resource
    } else {
        TypeCategory::DataType
    }
}

/// Category a document's type will carry, known before it is built
fn document_category(document: &Document) -> TypeCategory {
    match &document.content {
        Some(Resource::StructureDefinition(sd)) => structure_category(sd),
        Some(Resource::ValueSet(_)) => TypeCategory::ValueSet,
        Some(Resource::CodeSystem(_)) => TypeCategory::CodeSystem,
        None => TypeCategory::None,
    }
}

/// `Patient.contact` becomes `PatientContact`
fn subtype_name(path: &str) -> String {
    path.split('.')
        .map(|segment| segment.trim_end_matches("[x]").to_upper_camel_case())
        .collect()
}

fn type_description(element: &ElementDefinition) -> Option<String> {
    element.definition.clone().or_else(|| element.short.clone())
}

fn property_description(element: &ElementDefinition) -> Option<String> {
    element.short.clone().or_else(|| element.definition.clone())
}

fn wrap_cardinality(node: TypeNode, element: &ElementDefinition) -> TypeNode {
    if element.is_single() {
        node
    } else {
        TypeNode::array(node)
    }
}

impl<'a> Resolver<'a> {
    pub(super) fn build_structure(
        &mut self,
        document: &'a Document,
        sd: &'a StructureDefinition,
    ) -> ResolveResult<TypeId> {
        let name = document.id.as_str();
        let category = structure_category(sd);
        if category == TypeCategory::Primitive {
            return Ok(self.build_primitive(name, sd.root_element()));
        }

        let base_type = sd
            .base_definition
            .as_deref()
            .map(|url| self.resolve_base_profile(url))
            .transpose()?;

        let root_id = self
            .registry
            .allocate(TypeNode::interface(name, base_type, category));

        let mut described = false;
        for element in sd.differential_elements() {
            if element.is_root() {
                if !described {
                    self.registry
                        .get_mut(root_id)
                        .set_description(type_description(element));
                    described = true;
                }
                continue;
            }
            self.walk_element(root_id, element)?;
        }

        self.apply_legacy_shims(root_id);
        Ok(root_id)
    }

    fn build_primitive(&mut self, name: &str, root: Option<&ElementDefinition>) -> TypeId {
        let intrinsic = primitive_intrinsic(name);
        if intrinsic.is_none() {
            self.report(ResolveError::UnknownPrimitive(name.to_string()));
        }
        let mut node = TypeNode::primitive(name, intrinsic);
        node.set_description(root.and_then(type_description));
        self.registry.allocate(node)
    }

    /// Map a base profile URL to a type name and make sure that type gets visited
    fn resolve_base_profile(&mut self, url: &str) -> ResolveResult<String> {
        let config = self.config;
        let documents = self.documents;
        let base = url
            .strip_prefix(config.profile_url_prefix.as_str())
            .ok_or_else(|| ResolveError::UnrecognizedProfile(url.to_string()))?;
        let index = documents
            .get_index_of(base)
            .ok_or_else(|| ResolveError::UnresolvedBaseType(base.to_string()))?;
        self.require_base(index, base)?;
        Ok(base.to_string())
    }

    /// Visit a base type. A base still on the visit stack is a cycle and is
    /// accepted; one that finished without producing a type is not.
    fn require_base(&mut self, index: usize, base: &str) -> ResolveResult<()> {
        let resolved = self.reference_file(index);
        if resolved.is_none() && self.states[index].status != VisitStatus::Queued {
            return Err(ResolveError::UnresolvedBaseType(base.to_string()));
        }
        Ok(())
    }

    fn walk_element(&mut self, root_id: TypeId, element: &ElementDefinition) -> ResolveResult<()> {
        let segments = element.segments();
        let Some((first, rest)) = segments.split_first() else {
            return Ok(());
        };
        let Some((last, intermediate)) = rest.split_last() else {
            return Ok(());
        };

        self.check_hierarchy(root_id, first, &element.path)?;
        let container = self.find_container(root_id, intermediate, &element.path)?;

        if let Some(base) = last.strip_suffix("[x]") {
            self.add_choice_properties(container, base, element);
            return Ok(());
        }

        if element.is_prohibited() {
            return Ok(());
        }

        let Some(type_node) = self.resolve_element_type(root_id, element)? else {
            return Ok(());
        };
        let property = Property::new(*last, wrap_cardinality(type_node, element))
            .with_description(property_description(element))
            .required(element.is_required());
        self.add_property(container, property);
        Ok(())
    }

    /// The first path segment must name the type or one of its ancestors
    fn check_hierarchy(&self, root_id: TypeId, segment: &str, path: &str) -> ResolveResult<()> {
        let root = self.registry.get(root_id);
        let root_name = root.name().unwrap_or_default();
        if root_name == segment {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut next = root.as_interface().and_then(|i| i.base_type.as_deref());
        while let Some(name) = next {
            if name == segment {
                return Ok(());
            }
            if !seen.insert(name) {
                break;
            }
            next = self
                .registry
                .get_by_name(name)
                .and_then(TypeNode::as_interface)
                .and_then(|i| i.base_type.as_deref());
        }

        Err(ResolveError::PathOutsideHierarchy {
            path: path.to_string(),
            type_name: root_name.to_string(),
        })
    }

    fn find_container(
        &self,
        root_id: TypeId,
        intermediate: &[&str],
        path: &str,
    ) -> ResolveResult<TypeId> {
        let mut current = root_id;
        for segment in intermediate {
            let property =
                self.find_property(current, segment)
                    .ok_or_else(|| ResolveError::MissingProperty {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })?;
            current =
                self.container_of(&property.type_node)
                    .ok_or_else(|| ResolveError::NotAnObjectType {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })?;
        }
        Ok(current)
    }

    /// Look a property up on a type, then along its base chain
    fn find_property(&self, owner: TypeId, name: &str) -> Option<&Property> {
        let mut node = self.registry.get(owner);
        let mut seen = HashSet::new();
        loop {
            if let Some(property) = node
                .properties()
                .and_then(|properties| properties.iter().find(|p| p.name == name))
            {
                return Some(property);
            }
            let base = node.as_interface()?.base_type.as_deref()?;
            if !seen.insert(base) {
                return None;
            }
            node = self.registry.get_by_name(base)?;
        }
    }

    /// The registered object or interface a property type points at
    fn container_of(&self, node: &TypeNode) -> Option<TypeId> {
        match &node.kind {
            TypeKind::Array(inner) => self.container_of(inner),
            TypeKind::Reference(reference) => {
                let id = self.registry.lookup(&reference.name)?;
                self.registry.get(id).properties().map(|_| id)
            }
            _ => None,
        }
    }

    /// Append a property, replacing an earlier one of the same name
    fn add_property(&mut self, container: TypeId, property: Property) {
        let Some(properties) = self.registry.get_mut(container).properties_mut() else {
            return;
        };
        match properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => properties.push(property),
        }
    }

    /// Resolve a plain element's type. `Ok(None)` drops the property.
    fn resolve_element_type(
        &mut self,
        root_id: TypeId,
        element: &ElementDefinition,
    ) -> ResolveResult<Option<TypeNode>> {
        if let Some(reference) = element.content_reference.as_deref() {
            return match self.resolve_content_reference(root_id, reference) {
                Ok(node) => Ok(Some(node)),
                Err(error) => {
                    self.report(error);
                    Ok(None)
                }
            };
        }

        let codes = expand_type_codes(element);
        let mut node = match codes.as_slice() {
            [] => {
                self.report(ResolveError::NoUsableType(element.path.clone()));
                return Ok(None);
            }
            [code] if SUBTYPE_BASES.contains(&code.as_str()) => {
                self.synthesize_subtype(element, code)?
            }
            [code] => match self.resolve_type_option(code) {
                Some(node) => node,
                None => return Ok(None),
            },
            codes => {
                let members: Vec<TypeNode> = codes
                    .iter()
                    .filter_map(|code| self.resolve_type_option(code))
                    .collect();
                if members.is_empty() {
                    return Ok(None);
                }
                TypeNode::union(members)
            }
        };

        if let Some(url) = element
            .binding
            .as_ref()
            .filter(|binding| !binding.is_example())
            .and_then(|binding| binding.value_set_url())
        {
            match self.resolve_binding(url) {
                Ok(name) => node.bind(&name),
                Err(error) => self.report(error),
            }
        }

        Ok(Some(node))
    }

    /// A named reference to a declared type, visiting it on first use
    fn resolve_type_option(&mut self, code: &str) -> Option<TypeNode> {
        let documents = self.documents;
        let Some(index) = documents.get_index_of(code) else {
            self.report(ResolveError::UnknownTypeName(code.to_string()));
            return None;
        };
        self.reference_file(index);
        let category = documents
            .get_index(index)
            .map(document_category)
            .unwrap_or_default();
        Some(TypeNode::reference(code, category))
    }

    fn synthesize_subtype(
        &mut self,
        element: &ElementDefinition,
        base: &str,
    ) -> ResolveResult<TypeNode> {
        let documents = self.documents;
        let index = documents
            .get_index_of(base)
            .ok_or_else(|| ResolveError::UnresolvedBaseType(base.to_string()))?;
        self.require_base(index, base)?;

        let name = subtype_name(&element.path);
        let mut node = TypeNode::interface(&name, Some(base.to_string()), TypeCategory::SubType);
        node.set_description(type_description(element));
        let id = self.registry.allocate(node);
        if !self.registry.register(id) {
            self.report(ResolveError::DuplicateTypeName(name.clone()));
        }
        Ok(TypeNode::reference(name, TypeCategory::SubType))
    }

    fn resolve_content_reference(
        &self,
        root_id: TypeId,
        reference: &str,
    ) -> ResolveResult<TypeNode> {
        let fragment = reference
            .strip_prefix('#')
            .ok_or_else(|| ResolveError::InvalidContentReference(reference.to_string()))?;
        let target = fragment
            .rsplit_once('.')
            .map_or(fragment, |(_, last)| last);

        let mut visited = HashSet::from([root_id]);
        let property = self
            .search_property(root_id, target, &mut visited)
            .ok_or_else(|| ResolveError::UnresolvedContentReference(reference.to_string()))?;
        let interface = self
            .container_of(&property.type_node)
            .and_then(|id| self.registry.get(id).as_interface())
            .ok_or_else(|| ResolveError::ContentReferenceNotInterface(reference.to_string()))?;

        Ok(TypeNode::reference(
            interface.name.clone(),
            TypeCategory::SubType,
        ))
    }

    /// Depth-first search through a type and its sub-types
    fn search_property(
        &self,
        owner: TypeId,
        target: &str,
        visited: &mut HashSet<TypeId>,
    ) -> Option<&Property> {
        for property in self.registry.get(owner).properties()? {
            if property.name == target {
                return Some(property);
            }
            let Some(child) = self.container_of(&property.type_node) else {
                continue;
            };
            if self.registry.get(child).category != TypeCategory::SubType {
                continue;
            }
            if visited.insert(child) {
                if let Some(found) = self.search_property(child, target, visited) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// One property per type option; adjacent repeats of a code share a union
    fn add_choice_properties(&mut self, container: TypeId, base: &str, element: &ElementDefinition) {
        let codes = expand_type_codes(element);
        if codes.is_empty() {
            self.report(ResolveError::NoUsableType(element.path.clone()));
            return;
        }

        let mut start = 0;
        while start < codes.len() {
            let code = &codes[start];
            let end = codes[start..]
                .iter()
                .position(|c| c != code)
                .map_or(codes.len(), |offset| start + offset);
            let repeats = end - start;
            start = end;

            let Some(node) = self.resolve_type_option(code) else {
                continue;
            };
            let node = TypeNode::union(vec![node; repeats]);
            let property = Property::new(
                format!("{base}{}", code.to_upper_camel_case()),
                wrap_cardinality(node, element),
            )
            .with_description(property_description(element))
            .required(element.is_required());
            self.add_property(container, property);
        }
    }

    /// Compatibility properties older consumers expect on the two root types
    fn apply_legacy_shims(&mut self, root_id: TypeId) {
        if !self.config.legacy_shims {
            return;
        }
        let node = self.registry.get_mut(root_id);
        let shim = match node.name() {
            Some("Resource") => Property::new(
                "resourceType",
                TypeNode::primitive("string", Some(Intrinsic::String)),
            )
            .with_description(Some("The type of the resource.".to_string())),
            Some("Element") => Property::new(
                "fhir_comments",
                TypeNode::array(TypeNode::primitive("string", Some(Intrinsic::String))),
            )
            .with_description(Some("Comments attached to the element.".to_string())),
            _ => return,
        };
        let Some(properties) = node.properties_mut() else {
            return;
        };
        if !properties.iter().any(|p| p.name == shim.name) {
            properties.insert(0, shim);
        }
    }
}
