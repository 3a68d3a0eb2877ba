//! Rendering of individual declarations and type expressions

use crate::generators::GeneratorConfig;
use crate::ir::{EnumType, Intrinsic, InterfaceType, Property, TypeKind, TypeNode, TypeReference};
use crate::resolver::Resolution;

const INDENT: &str = "    ";

pub(super) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

pub(super) fn indent(text: &str, depth: usize) -> String {
    let prefix = INDENT.repeat(depth);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn string_literal(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

fn doc_comment(text: &str, depth: usize) -> String {
    let prefix = INDENT.repeat(depth);
    let text = text.replace("*/", "*\\/");
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    match lines.as_slice() {
        [] => String::new(),
        [line] => format!("{prefix}/** {line} */\n"),
        lines => {
            let mut out = format!("{prefix}/**\n");
            for line in lines {
                if line.is_empty() {
                    out.push_str(&format!("{prefix} *\n"));
                } else {
                    out.push_str(&format!("{prefix} * {line}\n"));
                }
            }
            out.push_str(&format!("{prefix} */\n"));
            out
        }
    }
}

fn intrinsic_name(intrinsic: Option<Intrinsic>) -> &'static str {
    match intrinsic {
        Some(Intrinsic::String) => "string",
        Some(Intrinsic::Number) => "number",
        Some(Intrinsic::Boolean) => "boolean",
        None => "any",
    }
}

fn render_reference(reference: &TypeReference, resolution: &Resolution) -> String {
    let target = resolution.get(&reference.name);
    match target.map(|node| &node.kind) {
        Some(TypeKind::Primitive(primitive)) => match &reference.binding {
            Some(binding) => binding.clone(),
            None => intrinsic_name(primitive.intrinsic).to_string(),
        },
        Some(_) => reference.name.clone(),
        None => reference
            .binding
            .clone()
            .unwrap_or_else(|| "any".to_string()),
    }
}

/// TypeScript type expression for a node
pub fn render_type(node: &TypeNode, resolution: &Resolution) -> String {
    match &node.kind {
        TypeKind::Reference(reference) => render_reference(reference, resolution),
        TypeKind::Object(object) => {
            if object.properties.is_empty() {
                return "{}".to_string();
            }
            let fields: Vec<String> = object
                .properties
                .iter()
                .map(|p| {
                    let marker = if p.optional { "?" } else { "" };
                    format!(
                        "{}{marker}: {}",
                        property_key(&p.name),
                        render_type(&p.type_node, resolution)
                    )
                })
                .collect();
            format!("{{ {} }}", fields.join("; "))
        }
        TypeKind::Interface(interface) => interface.name.clone(),
        TypeKind::Enum(enumeration) => enumeration.name.clone(),
        TypeKind::Array(element) => format!("{}[]", render_type(element, resolution)),
        TypeKind::Union(members) => {
            let members: Vec<String> = members
                .iter()
                .map(|member| render_type(member, resolution))
                .collect();
            format!("({})", members.join(" | "))
        }
        TypeKind::Primitive(primitive) => intrinsic_name(primitive.intrinsic).to_string(),
    }
}

fn generate_property(property: &Property, resolution: &Resolution, config: &GeneratorConfig) -> String {
    let mut code = String::new();
    if config.generate_docs {
        if let Some(description) = &property.description {
            code.push_str(&doc_comment(description, 1));
        }
    }
    let marker = if property.optional { "?" } else { "" };
    code.push_str(&format!(
        "{INDENT}{}{marker}: {};\n",
        property_key(&property.name),
        render_type(&property.type_node, resolution)
    ));
    code
}

/// `export interface` declaration
pub(super) fn generate_interface(
    interface: &InterfaceType,
    resolution: &Resolution,
    config: &GeneratorConfig,
) -> String {
    let mut code = String::new();

    if config.generate_docs {
        if let Some(description) = &interface.description {
            code.push_str(&doc_comment(description, 0));
        }
    }

    code.push_str(&format!("export interface {}", interface.name));
    if let Some(base) = &interface.base_type {
        code.push_str(&format!(" extends {base}"));
    }
    code.push_str(" {\n");

    for property in &interface.properties {
        code.push_str(&generate_property(property, resolution, config));
    }

    code.push('}');
    code
}

/// `export enum` declaration with string-valued members
pub(super) fn generate_enum(enumeration: &EnumType, config: &GeneratorConfig) -> String {
    let mut code = String::new();

    if config.generate_docs {
        if let Some(description) = &enumeration.description {
            code.push_str(&doc_comment(description, 0));
        }
    }

    code.push_str(&format!("export enum {} {{\n", enumeration.name));
    for member in &enumeration.members {
        if config.generate_docs {
            if let Some(text) = member.display.as_ref().or(member.description.as_ref()) {
                code.push_str(&doc_comment(text, 1));
            }
        }
        code.push_str(&format!(
            "{INDENT}{} = {},\n",
            member.name,
            string_literal(&member.value)
        ));
    }
    code.push('}');
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("valueQuantity"));
        assert!(is_identifier("_3rdParty"));
        assert!(!is_identifier("3rd"));
        assert!(!is_identifier("fhir-comments"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_doc_comment_shapes() {
        assert_eq!(doc_comment("Single line", 0), "/** Single line */\n");
        assert_eq!(
            doc_comment("First\nSecond", 1),
            "    /**\n     * First\n     * Second\n     */\n"
        );
        assert_eq!(doc_comment("a */ b", 0), "/** a *\\/ b */\n");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(property_key("fhir_comments"), "fhir_comments");
        assert_eq!(property_key("content-type"), "\"content-type\"");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 1), "    a\n\n    b");
    }
}
