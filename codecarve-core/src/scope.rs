//! Enclosing-scope resolution
//!
//! Reconstructs namespace/class qualification by walking the ancestor
//! chain of a function's name node. Ancestors are visited innermost-first
//! and the accumulated qualifiers are reversed at the end. C has no
//! nesting constructs and always yields an empty scope.

use tree_sitter::Node;

use crate::error::Result;
use crate::language::Language;
use crate::names::capture_name_node;
use crate::tree::{ancestors, node_text};

/// Ordered enclosing qualifiers of a definition, outermost first.
pub fn function_scope(node: Node<'_>, src: &[u8], lang: Language) -> Result<Vec<String>> {
    match lang {
        Language::C => Ok(Vec::new()),
        Language::Cpp => scope_cpp(node, src),
        Language::Java => Ok(scope_java(node, src)),
    }
}

fn scope_cpp(fnode: Node<'_>, src: &[u8]) -> Result<Vec<String>> {
    let name_node = capture_name_node(fnode, src, Language::Cpp)?.unwrap_or(fnode);

    let mut out: Vec<String> = Vec::new();
    for p in ancestors(name_node) {
        match p.kind() {
            "namespace_definition" => match p.child_by_field_name("name") {
                Some(name) => {
                    for part in node_text(name, src).split("::") {
                        out.push(part.to_string());
                    }
                }
                // Anonymous namespace contributes an empty qualifier.
                None => out.push(String::new()),
            },
            "class_specifier" | "struct_specifier" => {
                if let Some(name) = p.child_by_field_name("name") {
                    out.push(node_text(name, src).into_owned());
                }
            }
            "qualified_identifier" => {
                if let Some(scope) = p.child_by_field_name("scope") {
                    out.push(node_text(scope, src).into_owned());
                }
            }
            _ => {}
        }
    }

    out.reverse();
    Ok(out)
}

fn scope_java(node: Node<'_>, src: &[u8]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in ancestors(node) {
        if p.kind() == "class_declaration" {
            if let Some(name) = p.child_by_field_name("name") {
                out.push(node_text(name, src).into_owned());
            }
        }
    }
    out.reverse();
    out
}
