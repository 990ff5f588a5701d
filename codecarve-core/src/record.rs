//! Function model
//!
//! A [`FunctionRecord`] wraps one located definition node and derives
//! everything else on demand from the immutable node + source pair:
//! names, scope, ranges, text, statement maps, and abstraction. Records
//! are created in a single extraction pass per file and never mutated
//! (apart from caller-owned metadata annotations).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::abstraction::{abstract_function, AbstractionPolicy};
use crate::comments::strip_comments_regex;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::language::Language;
use crate::names::{extract_name_ast, extract_name_regex};
use crate::scope::function_scope;
use crate::similarity;
use crate::stmt::stmt_map;
use crate::tree::node_bytes;

/// One captured function/method definition.
pub struct FunctionRecord<'a> {
    lang: Language,
    src: &'a [u8],
    idx: usize,
    node: Node<'a>,
    meta: BTreeMap<String, String>,
}

impl<'a> FunctionRecord<'a> {
    pub(crate) fn new(lang: Language, src: &'a [u8], idx: usize, node: Node<'a>) -> Self {
        FunctionRecord {
            lang,
            src,
            idx,
            node,
            meta: BTreeMap::new(),
        }
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    /// Sequential 0-based index among the functions found in this file.
    pub fn index(&self) -> usize {
        self.idx
    }

    pub fn node(&self) -> Node<'a> {
        self.node
    }

    /// Caller-supplied annotations; opaque to the core.
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.meta
    }

    /// Short name of the function.
    ///
    /// C++ goes through the declarator query first (qualified names are
    /// reduced to their terminal component); every language falls back to
    /// the text heuristic. `None` is a valid unnamed function, not an
    /// error — filtering is caller policy.
    pub fn name(&self) -> Option<String> {
        if self.lang == Language::Cpp {
            // Query patterns are compiled-in constants; a failure here is
            // indistinguishable from an unresolvable declarator.
            if let Ok(Some(name)) = extract_name_ast(self.node, self.src, self.lang) {
                return Some(name);
            }
        }
        extract_name_regex(&self.code())
    }

    /// Enclosing qualifiers, outermost first. Empty for C.
    pub fn scope(&self) -> Vec<String> {
        function_scope(self.node, self.src, self.lang).unwrap_or_default()
    }

    /// Scope-qualified name, joined with `::` for C++; other languages
    /// return the short name.
    pub fn fullname(&self) -> Option<String> {
        let name = self.name()?;
        if self.lang.has_qualified_names() {
            let mut parts = self.scope();
            parts.push(name);
            Some(parts.join("::"))
        } else {
            Some(name)
        }
    }

    /// 1-based line of the first byte.
    pub fn start_line(&self) -> usize {
        self.node.start_position().row + 1
    }

    /// 1-based line of the last byte.
    pub fn end_line(&self) -> usize {
        self.node.end_position().row + 1
    }

    pub fn start_byte(&self) -> usize {
        self.node.start_byte()
    }

    pub fn end_byte(&self) -> usize {
        self.node.end_byte()
    }

    /// Inclusive range of lines spanned by the definition.
    pub fn line_range(&self) -> RangeInclusive<usize> {
        self.start_line()..=self.end_line()
    }

    /// Raw bytes of the definition.
    pub fn code_bytes(&self) -> &'a [u8] {
        node_bytes(self.node, self.src)
    }

    /// Decoded text of the definition; invalid sequences are replaced,
    /// never fatal.
    pub fn code(&self) -> String {
        String::from_utf8_lossy(self.code_bytes()).into_owned()
    }

    /// The definition split into lines.
    pub fn code_lines(&self) -> Vec<String> {
        crate::comments::split_lines(&self.code())
            .map(str::to_string)
            .collect()
    }

    /// Map of 1-based line number to the statement nodes covering it.
    pub fn stmt_map(&self) -> HashMap<usize, Vec<Node<'a>>> {
        stmt_map(self.node)
    }

    /// Abstract this definition under the given policy.
    pub fn abstracted(&self, policy: &AbstractionPolicy, deadline: Deadline) -> Result<Vec<String>> {
        abstract_function(self.node, self.src, policy, deadline)
    }

    /// Similarity against another record, in [0, 1].
    pub fn similarity(&self, other: &FunctionRecord<'_>) -> f64 {
        similarity::ratio(&self.code(), &other.code())
    }

    /// Similarity against raw text, in [0, 1].
    pub fn similarity_text(&self, text: &str) -> f64 {
        similarity::ratio(&self.code(), text)
    }

    /// A serializable projection of the derived attributes.
    pub fn summary(&self) -> FunctionSummary {
        FunctionSummary {
            lang: self.lang.name().to_string(),
            index: self.idx,
            name: self.name(),
            fullname: self.fullname(),
            scope: self.scope(),
            start_line: self.start_line(),
            end_line: self.end_line(),
            start_byte: self.start_byte(),
            end_byte: self.end_byte(),
            meta: self.meta.clone(),
        }
    }
}

/// Comment- and whitespace-insensitive form used for structural equality.
fn structural_form(code: &str) -> String {
    strip_comments_regex(code)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

impl PartialEq for FunctionRecord<'_> {
    /// Structural identity: equal code after comment removal and
    /// whitespace collapse, not node identity.
    fn eq(&self, other: &Self) -> bool {
        structural_form(&self.code()) == structural_form(&other.code())
    }
}

impl PartialEq<str> for FunctionRecord<'_> {
    fn eq(&self, other: &str) -> bool {
        structural_form(&self.code()) == structural_form(other)
    }
}

impl PartialEq<&str> for FunctionRecord<'_> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Debug for FunctionRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sample: String = self
            .code()
            .chars()
            .take(100)
            .collect::<String>()
            .replace('\n', "\\n")
            .replace('\r', "\\r");
        write!(f, "FunctionRecord(\"{sample}\")")
    }
}

/// Flat, serializable view of one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub lang: String,
    pub index: usize,
    pub name: Option<String>,
    pub fullname: Option<String>,
    pub scope: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}
