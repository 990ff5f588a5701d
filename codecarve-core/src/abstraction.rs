//! Identifier abstraction
//!
//! Walks a function body over its leaf-like nodes and rewrites each one
//! under a per-category policy, producing the token stream consumed by
//! clone comparison. Placeholder state lives in a per-run value, so
//! numbering never leaks between functions or between concurrent runs.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::language::Language;
use crate::parse::ParsedFile;
use crate::symbols::is_known_function;
use crate::tree::{collect_nodes, node_bytes, node_text};

/// How one syntactic category is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbstractionMode {
    /// Emit the original text unchanged.
    #[default]
    Keep,
    /// Emit the category tag with no suffix; distinct identifiers of the
    /// same category become textually identical.
    Tag,
    /// Emit `TAG0`, `TAG1`, ... — one suffix per distinct original text,
    /// stable within a single run.
    Numbered,
    /// Emit the original text for known standard/system symbols and the
    /// category tag for everything else. Called-function names only.
    KeepKnown,
}

/// One selector per syntactic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbstractionPolicy {
    pub function_name: AbstractionMode,
    pub local_var: AbstractionMode,
    pub parameter: AbstractionMode,
    pub label: AbstractionMode,
    pub field: AbstractionMode,
    pub var_type: AbstractionMode,
    pub literal: AbstractionMode,
    pub call: AbstractionMode,
    /// Identifiers with no local mapping, presumed defined in an outer
    /// scope.
    pub global_symbol: AbstractionMode,
}

impl Default for AbstractionPolicy {
    /// The conventional signature configuration: names and labels
    /// collapse to bare tags, locals/parameters/globals get numbered
    /// placeholders, everything else is kept.
    fn default() -> Self {
        AbstractionPolicy {
            function_name: AbstractionMode::Tag,
            local_var: AbstractionMode::Numbered,
            parameter: AbstractionMode::Numbered,
            label: AbstractionMode::Tag,
            field: AbstractionMode::Keep,
            var_type: AbstractionMode::Keep,
            literal: AbstractionMode::Keep,
            call: AbstractionMode::Keep,
            global_symbol: AbstractionMode::Numbered,
        }
    }
}

impl AbstractionPolicy {
    /// A policy that rewrites nothing.
    pub fn keep_everything() -> Self {
        AbstractionPolicy {
            function_name: AbstractionMode::Keep,
            local_var: AbstractionMode::Keep,
            parameter: AbstractionMode::Keep,
            label: AbstractionMode::Keep,
            field: AbstractionMode::Keep,
            var_type: AbstractionMode::Keep,
            literal: AbstractionMode::Keep,
            call: AbstractionMode::Keep,
            global_symbol: AbstractionMode::Keep,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.call == AbstractionMode::Numbered {
            return Err(Error::InvalidPolicy(
                "called-function abstraction does not support numbered placeholders",
            ));
        }
        let non_call_modes = [
            self.function_name,
            self.local_var,
            self.parameter,
            self.label,
            self.field,
            self.var_type,
            self.literal,
            self.global_symbol,
        ];
        if non_call_modes.contains(&AbstractionMode::KeepKnown) {
            return Err(Error::InvalidPolicy(
                "keep-known applies only to called-function names",
            ));
        }
        Ok(())
    }
}

/// Per-run placeholder assignments. Discarded when the run ends.
#[derive(Default)]
struct AbstractionState {
    /// Parameters and local variables share one map so body references
    /// resolve to the declaration-site placeholder.
    locals: HashMap<Vec<u8>, String>,
    globals: HashMap<Vec<u8>, String>,
    labels: HashMap<Vec<u8>, String>,
    fields: HashMap<Vec<u8>, String>,
    types: HashMap<Vec<u8>, String>,
    counters: HashMap<&'static str, usize>,
}

impl AbstractionState {
    fn alloc(&mut self, tag: &'static str) -> String {
        let count = self.counters.entry(tag).or_insert(0);
        let placeholder = format!("{tag}{count}");
        *count += 1;
        placeholder
    }
}

/// Node kinds treated as atomic even though they have internal structure.
const ATOMIC_KINDS: &[&str] = &[
    "concatenated_string",
    "string_literal",
    "char_literal",
    "number_literal",
    "sized_type_specifier",
];

const STRING_LITERAL_KINDS: &[&str] = &["concatenated_string", "string_literal", "char_literal"];

const LITERAL_KINDS: &[&str] = &[
    "concatenated_string",
    "string_literal",
    "char_literal",
    "number_literal",
];

const TYPE_KINDS: &[&str] = &["sized_type_specifier", "primitive_type", "type_identifier"];

/// Storage-class and qualifier keywords that carry no signature value.
const DROPPED_KEYWORDS: &[&str] = &[
    "static", "const", "volatile", "inline", "extern", "register", "typedef",
];

fn is_leaf_like(node: Node<'_>) -> bool {
    node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind())
}

/// Nearest declaration-chain root: follow parents for as long as this
/// node fills their `declarator` field.
fn declaration_root(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        let fills_declarator = parent
            .child_by_field_name("declarator")
            .map(|d| d.id() == current.id())
            .unwrap_or(false);
        if !fills_declarator {
            break;
        }
        current = parent;
    }
    current
}

fn is_decl_local_var(node: Node<'_>) -> bool {
    declaration_root(node).kind() == "declaration"
}

fn is_decl_parameter(node: Node<'_>) -> bool {
    declaration_root(node).kind() == "parameter_declaration"
}

fn is_function_declarator_name(node: Node<'_>) -> bool {
    match node.parent() {
        Some(parent) if parent.kind() == "function_declarator" => parent
            .child_by_field_name("declarator")
            .map(|d| d.id() == node.id())
            .unwrap_or(false),
        _ => false,
    }
}

/// Abstract one function body into an ordered token sequence.
pub fn abstract_function(
    func: Node<'_>,
    src: &[u8],
    policy: &AbstractionPolicy,
    deadline: Deadline,
) -> Result<Vec<String>> {
    policy.validate()?;

    let mut state = AbstractionState::default();
    let mut output: Vec<String> = Vec::new();

    for node in collect_nodes(func, |n| !is_leaf_like(n), is_leaf_like) {
        deadline.check()?;

        let text = node_bytes(node, src);
        let kind = node.kind();
        let parent_kind = node.parent().map(|p| p.kind()).unwrap_or("");

        if is_function_declarator_name(node) {
            // int "ns::foo"(int a, int b) {
            match policy.function_name {
                AbstractionMode::Keep => emit_text(&mut output, node, src),
                _ => output.push("FNAME".to_string()),
            }
        } else if kind == "identifier" && is_decl_parameter(node) {
            // int foo(int "a", int b)
            rewrite_binding(
                &mut output,
                node,
                src,
                policy.parameter,
                "FPARAM",
                &mut state,
                BindingMap::Locals,
            );
        } else if kind == "identifier" && is_decl_local_var(node) {
            // int "x" = 0;
            rewrite_binding(
                &mut output,
                node,
                src,
                policy.local_var,
                "LVAR",
                &mut state,
                BindingMap::Locals,
            );
        } else if kind == "field_identifier" {
            rewrite_binding(
                &mut output,
                node,
                src,
                policy.field,
                "FIELD",
                &mut state,
                BindingMap::Fields,
            );
        } else if kind == "statement_identifier"
            && (parent_kind == "labeled_statement" || parent_kind == "goto_statement")
        {
            // "err": ...;  and  goto "err";
            rewrite_binding(
                &mut output,
                node,
                src,
                policy.label,
                "LABEL",
                &mut state,
                BindingMap::Labels,
            );
        } else if TYPE_KINDS.contains(&kind) {
            // "unsigned int" x;
            rewrite_binding(
                &mut output,
                node,
                src,
                policy.var_type,
                "VTYPE",
                &mut state,
                BindingMap::Types,
            );
        } else if LITERAL_KINDS.contains(&kind) {
            match policy.literal {
                AbstractionMode::Keep => emit_text(&mut output, node, src),
                _ => {
                    let tag = if STRING_LITERAL_KINDS.contains(&kind) {
                        "STR"
                    } else {
                        "NUM"
                    };
                    output.push(tag.to_string());
                }
            }
        } else if kind == "identifier" && parent_kind == "call_expression" {
            // res = "func"(1, 2, 3);
            match policy.call {
                AbstractionMode::Keep => emit_text(&mut output, node, src),
                AbstractionMode::KeepKnown => {
                    if is_known_function(&node_text(node, src)) {
                        emit_text(&mut output, node, src);
                    } else {
                        output.push("FCALL".to_string());
                    }
                }
                _ => output.push("FCALL".to_string()),
            }
        } else if kind == "identifier" {
            if let Some(mapped) = state.locals.get(text) {
                output.push(mapped.clone());
            } else {
                // Possibly a symbol defined in an outer scope.
                rewrite_binding(
                    &mut output,
                    node,
                    src,
                    policy.global_symbol,
                    "GSYM",
                    &mut state,
                    BindingMap::Globals,
                );
            }
        } else if kind.contains("comment") || DROPPED_KEYWORDS.contains(&kind) {
            // Emit nothing.
        } else {
            emit_text(&mut output, node, src);
        }
    }

    Ok(output)
}

/// Parse a whole buffer and abstract its root.
pub fn abstract_source(
    src: &[u8],
    lang: Language,
    policy: &AbstractionPolicy,
    deadline: Deadline,
) -> Result<Vec<String>> {
    let file = ParsedFile::parse(src.to_vec(), lang)?;
    abstract_function(file.root(), file.source(), policy, deadline)
}

enum BindingMap {
    Locals,
    Globals,
    Labels,
    Fields,
    Types,
}

fn emit_text(output: &mut Vec<String>, node: Node<'_>, src: &[u8]) {
    output.push(node_text(node, src).into_owned());
}

fn rewrite_binding(
    output: &mut Vec<String>,
    node: Node<'_>,
    src: &[u8],
    mode: AbstractionMode,
    tag: &'static str,
    state: &mut AbstractionState,
    which: BindingMap,
) {
    if mode == AbstractionMode::Keep {
        emit_text(output, node, src);
        return;
    }

    let text = node_bytes(node, src).to_vec();
    let placeholder = match mode {
        AbstractionMode::Numbered => {
            if !map_of(state, &which).contains_key(&text) {
                let allocated = state.alloc(tag);
                map_of(state, &which).insert(text.clone(), allocated);
            }
            map_of(state, &which)[&text].clone()
        }
        _ => {
            let fixed = tag.to_string();
            map_of(state, &which).insert(text, fixed.clone());
            fixed
        }
    };
    output.push(placeholder);
}

fn map_of<'s>(state: &'s mut AbstractionState, which: &BindingMap) -> &'s mut HashMap<Vec<u8>, String> {
    match which {
        BindingMap::Locals => &mut state.locals,
        BindingMap::Globals => &mut state.globals,
        BindingMap::Labels => &mut state.labels,
        BindingMap::Fields => &mut state.fields,
        BindingMap::Types => &mut state.types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::{locate_functions, ExtractOptions};

    fn abstract_first(src: &str, lang: Language, policy: &AbstractionPolicy) -> Vec<String> {
        let file = ParsedFile::parse(src.as_bytes().to_vec(), lang).unwrap();
        let funcs = locate_functions(
            file.root(),
            file.source(),
            lang,
            &ExtractOptions::default(),
        )
        .unwrap();
        abstract_function(funcs[0], file.source(), policy, Deadline::none()).unwrap()
    }

    #[test]
    fn test_keep_everything_round_trips_tokens() {
        let src = "int add(int a, int b) { return a + b; }";
        let tokens = abstract_first(src, Language::C, &AbstractionPolicy::keep_everything());
        let joined: String = tokens.concat();
        let squeezed: String = src.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(joined, squeezed);
    }

    #[test]
    fn test_keep_everything_drops_comments() {
        let src = "int f() { /* gone */ return 1; // also gone\n}";
        let tokens = abstract_first(src, Language::C, &AbstractionPolicy::keep_everything());
        assert!(tokens.iter().all(|t| !t.contains("gone")));
    }

    #[test]
    fn test_parameter_and_local_numbering() {
        // x maps to FPARAM0 at the declaration and in the body; y maps
        // to LVAR0.
        let src = "namespace A { class B { void foo(int x){ int y = x; } }; }";
        let tokens = abstract_first(src, Language::Cpp, &AbstractionPolicy::default());
        assert!(tokens.contains(&"FPARAM0".to_string()), "tokens: {tokens:?}");
        assert!(tokens.contains(&"LVAR0".to_string()), "tokens: {tokens:?}");
        assert_eq!(
            tokens.iter().filter(|t| *t == "FPARAM0").count(),
            2,
            "declaration site and body use: {tokens:?}"
        );
    }

    #[test]
    fn test_numbered_placeholders_are_stable_and_distinct() {
        let src = "void f(int a, int b) { a = b; b = a; a = a; }";
        let tokens = abstract_first(src, Language::C, &AbstractionPolicy::default());
        let a_count = tokens.iter().filter(|t| *t == "FPARAM0").count();
        let b_count = tokens.iter().filter(|t| *t == "FPARAM1").count();
        assert_eq!(a_count, 4, "tokens: {tokens:?}");
        assert_eq!(b_count, 3, "tokens: {tokens:?}");
    }

    #[test]
    fn test_function_name_tag() {
        let src = "int compute(void) { return 1; }";
        let tokens = abstract_first(src, Language::C, &AbstractionPolicy::default());
        assert!(tokens.contains(&"FNAME".to_string()));
        assert!(!tokens.contains(&"compute".to_string()));
    }

    #[test]
    fn test_literals_collapse_to_str_and_num() {
        let src = r#"void f() { int x = 42; const char *s = "hi"; char c = 'c'; }"#;
        let policy = AbstractionPolicy {
            literal: AbstractionMode::Tag,
            ..AbstractionPolicy::keep_everything()
        };
        let tokens = abstract_first(src, Language::C, &policy);
        assert!(tokens.contains(&"NUM".to_string()), "tokens: {tokens:?}");
        assert_eq!(
            tokens.iter().filter(|t| *t == "STR").count(),
            2,
            "string and char literals: {tokens:?}"
        );
        assert!(!tokens.iter().any(|t| t == "42" || t == "\"hi\""));
    }

    #[test]
    fn test_call_keep_known_symbols() {
        let src = "void f(char *d, char *s) { memcpy(d, s, 4); frobnicate(d); }";
        let policy = AbstractionPolicy {
            call: AbstractionMode::KeepKnown,
            ..AbstractionPolicy::keep_everything()
        };
        let tokens = abstract_first(src, Language::C, &policy);
        assert!(tokens.contains(&"memcpy".to_string()), "tokens: {tokens:?}");
        assert!(tokens.contains(&"FCALL".to_string()), "tokens: {tokens:?}");
        assert!(!tokens.contains(&"frobnicate".to_string()));
    }

    #[test]
    fn test_numbered_call_policy_is_an_error() {
        let policy = AbstractionPolicy {
            call: AbstractionMode::Numbered,
            ..AbstractionPolicy::default()
        };
        let file = ParsedFile::parse(b"void f() { g(); }".to_vec(), Language::C).unwrap();
        let err =
            abstract_function(file.root(), file.source(), &policy, Deadline::none()).unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy(_)));
    }

    #[test]
    fn test_keep_known_on_locals_is_an_error() {
        let policy = AbstractionPolicy {
            local_var: AbstractionMode::KeepKnown,
            ..AbstractionPolicy::default()
        };
        let file = ParsedFile::parse(b"void f() { int x; }".to_vec(), Language::C).unwrap();
        let err =
            abstract_function(file.root(), file.source(), &policy, Deadline::none()).unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy(_)));
    }

    #[test]
    fn test_labels_and_goto_share_placeholder() {
        let src = "void f() { goto out; out: return; }";
        let policy = AbstractionPolicy {
            label: AbstractionMode::Numbered,
            ..AbstractionPolicy::keep_everything()
        };
        let tokens = abstract_first(src, Language::C, &policy);
        assert_eq!(
            tokens.iter().filter(|t| *t == "LABEL0").count(),
            2,
            "goto site and definition site: {tokens:?}"
        );
    }

    #[test]
    fn test_storage_class_keywords_dropped() {
        let src = "void f() { static const unsigned long n = 1; (void)n; }";
        let tokens = abstract_first(src, Language::C, &AbstractionPolicy::keep_everything());
        assert!(!tokens.contains(&"static".to_string()), "tokens: {tokens:?}");
        assert!(!tokens.contains(&"const".to_string()), "tokens: {tokens:?}");
    }

    #[test]
    fn test_types_numbered() {
        let src = "void f() { unsigned int a = 1; unsigned int b = 2; long c = 3; }";
        let policy = AbstractionPolicy {
            var_type: AbstractionMode::Numbered,
            ..AbstractionPolicy::keep_everything()
        };
        let tokens = abstract_first(src, Language::C, &policy);
        // Same type text reuses its placeholder; a different type gets
        // the next number. The return type `void` claims VTYPE0.
        assert_eq!(
            tokens.iter().filter(|t| *t == "VTYPE1").count(),
            2,
            "tokens: {tokens:?}"
        );
        assert!(tokens.contains(&"VTYPE2".to_string()), "tokens: {tokens:?}");
    }

    #[test]
    fn test_fields_tagged() {
        let src = "void f(struct point *p) { p->x = 1; p->y = 2; }";
        let policy = AbstractionPolicy {
            field: AbstractionMode::Tag,
            ..AbstractionPolicy::keep_everything()
        };
        let tokens = abstract_first(src, Language::C, &policy);
        assert_eq!(
            tokens.iter().filter(|t| *t == "FIELD").count(),
            2,
            "tokens: {tokens:?}"
        );
    }

    #[test]
    fn test_global_symbol_numbered() {
        let src = "void f() { total += delta; total += delta; }";
        let tokens = abstract_first(src, Language::C, &AbstractionPolicy::default());
        assert_eq!(
            tokens.iter().filter(|t| *t == "GSYM0").count(),
            2,
            "tokens: {tokens:?}"
        );
        assert_eq!(
            tokens.iter().filter(|t| *t == "GSYM1").count(),
            2,
            "tokens: {tokens:?}"
        );
    }

    #[test]
    fn test_state_does_not_leak_between_runs() {
        let src = "void f(int a) { a = 1; }";
        let first = abstract_first(src, Language::C, &AbstractionPolicy::default());
        let second = abstract_first(src, Language::C, &AbstractionPolicy::default());
        assert_eq!(first, second);
        assert!(first.contains(&"FPARAM0".to_string()));
    }

    #[test]
    fn test_tag_mode_collapses_distinct_names() {
        let src = "void f() { int x = 1; int y = 2; x = y; }";
        let policy = AbstractionPolicy {
            local_var: AbstractionMode::Tag,
            ..AbstractionPolicy::keep_everything()
        };
        let tokens = abstract_first(src, Language::C, &policy);
        assert_eq!(
            tokens.iter().filter(|t| *t == "LVAR").count(),
            4,
            "both declarations and both uses: {tokens:?}"
        );
    }
}
