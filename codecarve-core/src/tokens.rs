//! Leaf tokenization
//!
//! Flattens a subtree into the ordered sequence of its leaf token texts.
//! Zero-width leaves (grammar artifacts with no source bytes) are skipped.

use tree_sitter::Node;

use crate::error::Result;
use crate::language::Language;
use crate::parse::ParsedFile;
use crate::tree::{collect_nodes, is_leaf, node_text};

/// Ordered leaf token texts under `node`.
pub fn tokenize<'a>(node: Node<'a>, src: &'a [u8]) -> Vec<String> {
    collect_nodes(node, |_| true, |n| is_leaf(n) && n.start_byte() < n.end_byte())
        .into_iter()
        .map(|n| node_text(n, src).into_owned())
        .collect()
}

/// Parse a whole buffer and tokenize its root.
pub fn tokenize_source(src: &[u8], lang: Language) -> Result<Vec<String>> {
    let file = ParsedFile::parse(src.to_vec(), lang)?;
    Ok(tokenize(file.root(), file.source()))
}
