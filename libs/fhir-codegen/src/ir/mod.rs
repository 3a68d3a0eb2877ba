//! Intermediate Representation (IR)
//!
//! Language-agnostic type graph built by the resolver and consumed by the
//! generators. Named types live in a [`TypeRegistry`] arena; properties refer
//! to them through [`TypeKind::Reference`] nodes, which are the only edges that
//! may form cycles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a node in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Provenance of a type node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TypeCategory {
    #[default]
    None,
    Primitive,
    DataType,
    Resource,
    SubType,
    ValueSet,
    CodeSystem,
}

impl TypeCategory {
    /// Categories produced from terminology documents
    pub fn is_terminology(self) -> bool {
        matches!(self, TypeCategory::ValueSet | TypeCategory::CodeSystem)
    }
}

/// A node of the type graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub category: TypeCategory,
    pub kind: TypeKind,
}

/// The closed set of node kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    /// A named type resolved lazily through the registry
    Reference(TypeReference),
    /// Anonymous property bag
    Object(ObjectType),
    /// Named structure with optional base type
    Interface(InterfaceType),
    /// Named set of codes
    Enum(EnumType),
    Array(Box<TypeNode>),
    /// Ordered, non-empty list of alternatives
    Union(Vec<TypeNode>),
    Primitive(PrimitiveType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    pub name: String,
    /// Name of an enumerated type further constraining the referenced type
    pub binding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ObjectType {
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub base_type: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<EnumMember>,
}

/// Host-language representation a primitive maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intrinsic {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub name: String,
    pub description: Option<String>,
    pub intrinsic: Option<Intrinsic>,
}

/// A property/field within an object or interface type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_node: TypeNode,
    pub optional: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, type_node: TypeNode) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_node,
            optional: true,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.optional = !required;
        self
    }
}

/// One code of an enumerated type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    /// The code itself
    pub value: String,
    pub description: Option<String>,
    pub display: Option<String>,
    /// Canonical URL of the code system the code belongs to
    pub system: Option<String>,
    pub case_sensitive: Option<bool>,
    /// Index of the parent concept in the same member list (is-a lookups only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

impl EnumMember {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            value: value.into(),
            description: None,
            display: None,
            system: None,
            case_sensitive: None,
            parent: None,
        }
    }

    /// Equal on every field except the ancestry back-reference
    pub fn same_content(&self, other: &EnumMember) -> bool {
        self.name == other.name
            && self.value == other.value
            && self.description == other.description
            && self.display == other.display
            && self.system == other.system
            && self.case_sensitive == other.case_sensitive
    }

    /// Compare codes honouring the member's case sensitivity (sensitive unless stated otherwise)
    pub fn matches_code(&self, code: &str) -> bool {
        if self.case_sensitive == Some(false) {
            self.value.eq_ignore_ascii_case(code)
        } else {
            self.value == code
        }
    }

    /// A copy detached from its source member table
    pub fn detached(&self) -> Self {
        Self {
            parent: None,
            ..self.clone()
        }
    }
}

// Node constructors. They only allocate; no resolution happens here.
impl TypeNode {
    pub fn reference(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            category,
            kind: TypeKind::Reference(TypeReference {
                name: name.into(),
                binding: None,
            }),
        }
    }

    pub fn object(category: TypeCategory) -> Self {
        Self {
            category,
            kind: TypeKind::Object(ObjectType::default()),
        }
    }

    pub fn interface(
        name: impl Into<String>,
        base_type: Option<String>,
        category: TypeCategory,
    ) -> Self {
        Self {
            category,
            kind: TypeKind::Interface(InterfaceType {
                name: name.into(),
                description: None,
                base_type,
                properties: Vec::new(),
            }),
        }
    }

    pub fn enumeration(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            category,
            kind: TypeKind::Enum(EnumType {
                name: name.into(),
                description: None,
                members: Vec::new(),
            }),
        }
    }

    pub fn array(element: TypeNode) -> Self {
        Self {
            category: TypeCategory::None,
            kind: TypeKind::Array(Box::new(element)),
        }
    }

    /// Build a union; a single member collapses to itself
    pub fn union(mut members: Vec<TypeNode>) -> Self {
        if members.len() == 1 {
            return members.remove(0);
        }
        Self {
            category: TypeCategory::None,
            kind: TypeKind::Union(members),
        }
    }

    pub fn primitive(name: impl Into<String>, intrinsic: Option<Intrinsic>) -> Self {
        Self {
            category: TypeCategory::Primitive,
            kind: TypeKind::Primitive(PrimitiveType {
                name: name.into(),
                description: None,
                intrinsic,
            }),
        }
    }

    /// Name of a named node (reference, interface, enum, primitive)
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Reference(r) => Some(&r.name),
            TypeKind::Interface(i) => Some(&i.name),
            TypeKind::Enum(e) => Some(&e.name),
            TypeKind::Primitive(p) => Some(&p.name),
            TypeKind::Object(_) | TypeKind::Array(_) | TypeKind::Union(_) => None,
        }
    }

    pub fn set_description(&mut self, description: Option<String>) {
        match &mut self.kind {
            TypeKind::Interface(i) => i.description = description,
            TypeKind::Enum(e) => e.description = description,
            TypeKind::Primitive(p) => p.description = description,
            TypeKind::Reference(_)
            | TypeKind::Object(_)
            | TypeKind::Array(_)
            | TypeKind::Union(_) => {}
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match &self.kind {
            TypeKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enum_mut(&mut self) -> Option<&mut EnumType> {
        match &mut self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Properties of object and interface nodes
    pub fn properties(&self) -> Option<&[Property]> {
        match &self.kind {
            TypeKind::Interface(i) => Some(&i.properties),
            TypeKind::Object(o) => Some(&o.properties),
            _ => None,
        }
    }

    pub fn properties_mut(&mut self) -> Option<&mut Vec<Property>> {
        match &mut self.kind {
            TypeKind::Interface(i) => Some(&mut i.properties),
            TypeKind::Object(o) => Some(&mut o.properties),
            _ => None,
        }
    }

    /// Attach a binding to every reference reachable without crossing an array
    pub fn bind(&mut self, binding: &str) {
        match &mut self.kind {
            TypeKind::Reference(r) => r.binding = Some(binding.to_string()),
            TypeKind::Union(members) => members.iter_mut().for_each(|m| m.bind(binding)),
            _ => {}
        }
    }
}

/// Name-indexed store of resolved type nodes.
///
/// Nodes are allocated into an arena and appended to the ordered output list
/// when registered. The first node registered under a name owns that name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    nodes: Vec<TypeNode>,
    order: Vec<TypeId>,
    names: HashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node without publishing it
    pub fn allocate(&mut self, node: TypeNode) -> TypeId {
        self.nodes.push(node);
        TypeId(self.nodes.len() - 1)
    }

    /// Append a node to the output list and index its name.
    ///
    /// Returns `false` when another node already owns the name; the node is
    /// still appended to the output list.
    pub fn register(&mut self, id: TypeId) -> bool {
        self.order.push(id);
        let Some(name) = self.nodes[id.0].name() else {
            return true;
        };
        if self.names.contains_key(name) {
            return false;
        }
        self.names.insert(name.to_string(), id);
        true
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.nodes[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TypeNode> {
        self.lookup(name).map(|id| self.get(id))
    }

    /// Registered nodes in first-visitation order
    pub fn ordered(&self) -> impl Iterator<Item = &TypeNode> {
        self.order.iter().map(|id| &self.nodes[id.0])
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
