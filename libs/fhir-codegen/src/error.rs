use thiserror::Error;

/// Problems found while resolving documents into types.
///
/// None of these stop a resolution run. They are collected, prefixed with
/// the filename of the document being visited, and returned alongside the
/// types that could be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    // Structural
    #[error("duplicate type name '{0}'")]
    DuplicateTypeName(String),

    #[error("unknown primitive type '{0}'")]
    UnknownPrimitive(String),

    // Reference
    #[error("unrecognized profile URI '{0}'")]
    UnrecognizedProfile(String),

    #[error("unresolved base type '{0}'")]
    UnresolvedBaseType(String),

    #[error("unknown type name '{0}'")]
    UnknownTypeName(String),

    #[error("unresolved value set '{0}'")]
    UnresolvedValueSet(String),

    #[error("binding '{0}' does not resolve to an enumerated type")]
    InvalidBinding(String),

    #[error("code system '{0}' could not be resolved for filtering")]
    UnresolvedCodeSystem(String),

    #[error("unsupported filter '{property} {op}'")]
    UnsupportedFilter { property: String, op: String },

    #[error("content reference '{0}' must start with '#'")]
    InvalidContentReference(String),

    #[error("content reference '{0}' matches no property")]
    UnresolvedContentReference(String),

    #[error("content reference '{0}' does not point at an interface")]
    ContentReferenceNotInterface(String),

    // Shape
    #[error("path '{path}' is outside the hierarchy of '{type_name}'")]
    PathOutsideHierarchy { path: String, type_name: String },

    #[error("path '{path}': no property '{segment}'")]
    MissingProperty { path: String, segment: String },

    #[error("path '{path}': '{segment}' is not an object type")]
    NotAnObjectType { path: String, segment: String },

    #[error("element '{0}' declares no usable type")]
    NoUsableType(String),
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
