//! Function name extraction
//!
//! Two layers: a declarator-position query against the definition node,
//! and a text heuristic fallback for grammars (or declarators) the query
//! cannot resolve. Many C projects define real functions through
//! function-declaring macros, so the macro-call pattern is tried first and
//! returned whole.

use std::sync::OnceLock;

use regex::Regex;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor};

use crate::error::Result;
use crate::language::{queries, registry, Language};
use crate::tree::node_text;

/// C-like reserved keywords; a declarator resolving to one of these is a
/// grammar artifact, not a name.
pub const CLIKE_RESERVED_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "float", "for", "goto", "if", "int", "long", "register",
    "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic",
    "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
    "_Thread_local", "inline", "__inline", "__inline__", "__attribute__", "__asm__",
];

fn rx_func_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)\s*\(").unwrap())
}

/// Matches `MACRO_NAME ( inner )` — e.g. `PHP_FUNCTION(foo)`.
pub fn rx_func_macro_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z_][A-Z0-9_]*\s*\(\s*(.+?)\s*\)").unwrap())
}

/// Text-heuristic name extraction over everything before the first `{`.
pub fn extract_name_regex(code: &str) -> Option<String> {
    let heading = code.split('{').next().unwrap_or(code);

    if let Some(m) = rx_func_macro_call().find(heading) {
        return Some(m.as_str().trim().to_string());
    }

    rx_func_call()
        .captures(heading)
        .map(|caps| caps[1].to_string())
}

/// The declarator-position name node of a definition, if resolvable.
///
/// For C++, a qualified identifier (`A::B::foo`) is descended to its
/// terminal `name` component; scope is recovered separately by the
/// ancestor walk.
pub fn capture_name_node<'a>(
    node: Node<'a>,
    src: &[u8],
    lang: Language,
) -> Result<Option<Node<'a>>> {
    let query = registry::query(lang, queries::function_declarator(lang))?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, node, src);

    let mut first: Option<Node<'a>> = None;
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let better = match first {
                Some(existing) => capture.node.start_byte() < existing.start_byte(),
                None => true,
            };
            if better {
                first = Some(capture.node);
            }
        }
    }

    let Some(mut found) = first else {
        return Ok(None);
    };

    if CLIKE_RESERVED_KEYWORDS.contains(&node_text(found, src).as_ref()) {
        return Ok(None);
    }

    if lang == Language::Cpp {
        while found.kind() == "qualified_identifier" {
            match found.child_by_field_name("name") {
                Some(inner) => found = inner,
                None => break,
            }
        }
    }

    Ok(Some(found))
}

/// AST-based short name of a definition.
///
/// Returns `None` when the declarator itself looks like a macro call;
/// the regex fallback handles those better from the raw heading text.
pub fn extract_name_ast(node: Node<'_>, src: &[u8], lang: Language) -> Result<Option<String>> {
    let Some(name_node) = capture_name_node(node, src, lang)? else {
        return Ok(None);
    };
    let name = node_text(name_node, src).into_owned();
    if rx_func_macro_call().is_match(&name) {
        return Ok(None);
    }
    Ok(Some(name))
}
