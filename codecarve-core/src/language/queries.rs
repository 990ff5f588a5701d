//! Per-language tree-sitter query patterns
//!
//! Pattern text lives here so the capture logic in `locate` and `names`
//! stays language-agnostic. Compiled queries are cached by the registry.

use super::Language;

/// Captures every function/method/constructor definition node.
pub fn function_definitions(lang: Language) -> &'static str {
    match lang {
        Language::C | Language::Cpp => "(function_definition) @function",
        Language::Java => {
            "(method_declaration) @function (constructor_declaration) @function"
        }
    }
}

/// Captures the declarator-position name node of one definition.
///
/// Run against a single definition node, not a whole file; the first
/// capture in document order is the definition's own declarator.
pub fn function_declarator(lang: Language) -> &'static str {
    match lang {
        Language::C => "(function_declarator declarator: _ @name)",
        Language::Cpp => {
            "(function_declarator declarator: _ @name) \
             (function_definition declarator: (operator_cast) @name) \
             (function_definition declarator: (qualified_identifier name: (operator_cast) @name))"
        }
        Language::Java => {
            "(method_declaration name: _ @name) (constructor_declaration name: _ @name)"
        }
    }
}
