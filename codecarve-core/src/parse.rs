//! Tree building
//!
//! A [`ParsedFile`] owns one file's raw bytes and the concrete syntax tree
//! parsed from them; every function record, node, and text view borrows
//! from it. Parsing is best-effort: syntactically invalid input yields a
//! tree with localized error nodes, never a failure — callers choose via
//! [`crate::locate::ExtractOptions`] whether erroneous subtrees are kept.

use tree_sitter::{Node, Tree};

use crate::error::{Error, Result};
use crate::language::{registry, Language};
use crate::locate::{self, ExtractOptions};
use crate::record::FunctionRecord;

/// One source file: immutable raw bytes, a language tag, and the tree.
///
/// The bytes are kept exactly as read — no attribute stripping or other
/// source-level preprocessing — so node byte offsets always index the
/// original file.
pub struct ParsedFile {
    lang: Language,
    src: Vec<u8>,
    tree: Tree,
}

impl ParsedFile {
    /// Parse a byte buffer.
    pub fn parse(src: impl Into<Vec<u8>>, lang: Language) -> Result<Self> {
        let src = src.into();
        let mut parser = registry::parser(lang)?;
        let tree = parser
            .parse(&src, None)
            .ok_or(Error::Parse { lang: lang.name() })?;
        Ok(ParsedFile { lang, src, tree })
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    /// The raw source bytes backing the tree.
    pub fn source(&self) -> &[u8] {
        &self.src
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Extract all function definitions in document order.
    ///
    /// Records are indexed sequentially from 0 within this file and are
    /// valid for as long as the file is.
    pub fn functions(&self, opts: &ExtractOptions) -> Result<Vec<FunctionRecord<'_>>> {
        let nodes = locate::locate_functions(self.root(), &self.src, self.lang, opts)?;
        Ok(nodes
            .into_iter()
            .enumerate()
            .map(|(idx, node)| FunctionRecord::new(self.lang, &self.src, idx, node))
            .collect())
    }
}
