//! Syntax-tree traversal helpers
//!
//! Thin utilities over tree-sitter nodes shared by the locator, the
//! tokenizer, the statement mapper, and the abstraction engine. Traversal
//! order is always explicit preorder so results are deterministic.

use std::borrow::Cow;

use tree_sitter::Node;

/// Collect nodes in preorder.
///
/// `descend` decides whether a node's children are visited; `keep` decides
/// whether the node itself lands in the output. Uses an explicit stack so
/// pathologically deep trees cannot overflow the call stack.
pub fn collect_nodes<'a>(
    root: Node<'a>,
    descend: impl Fn(Node<'a>) -> bool,
    keep: impl Fn(Node<'a>) -> bool,
) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if keep(node) {
            out.push(node);
        }
        if descend(node) {
            // Reverse so the leftmost child is popped first.
            let mut cursor = node.walk();
            let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
    }
    out
}

/// Ancestors of a node, innermost first (parent, grandparent, ...).
pub fn ancestors<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    let mut current = node.parent();
    while let Some(p) = current {
        out.push(p);
        current = p.parent();
    }
    out
}

/// A node's source text, decoded lossily.
///
/// Invalid byte sequences become replacement characters; text extraction
/// never fails.
pub fn node_text<'a>(node: Node<'a>, src: &'a [u8]) -> Cow<'a, str> {
    String::from_utf8_lossy(node_bytes(node, src))
}

/// A node's raw source bytes.
pub fn node_bytes<'a>(node: Node<'_>, src: &'a [u8]) -> &'a [u8] {
    &src[node.start_byte()..node.end_byte()]
}

/// Whether a node has no children at all.
pub fn is_leaf(node: Node<'_>) -> bool {
    node.child_count() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::parse::ParsedFile;

    #[test]
    fn test_collect_nodes_preorder() {
        let file = ParsedFile::parse(b"int x = 1;".to_vec(), Language::C).unwrap();
        let all = collect_nodes(file.root(), |_| true, |_| true);
        // Root comes first in preorder.
        assert_eq!(all[0].kind(), "translation_unit");
        // Offsets never decrease in preorder.
        for pair in all.windows(2) {
            assert!(pair[0].start_byte() <= pair[1].start_byte());
        }
    }

    #[test]
    fn test_collect_nodes_no_descend() {
        let file = ParsedFile::parse(b"int x = 1;".to_vec(), Language::C).unwrap();
        let only_root = collect_nodes(file.root(), |_| false, |_| true);
        assert_eq!(only_root.len(), 1);
    }

    #[test]
    fn test_ancestors_innermost_first() {
        let file = ParsedFile::parse(b"void f() { int x; }".to_vec(), Language::C).unwrap();
        let leaves = collect_nodes(file.root(), |_| true, is_leaf);
        let x = leaves
            .iter()
            .find(|n| node_bytes(**n, file.source()) == b"x")
            .copied()
            .unwrap();
        let chain = ancestors(x);
        assert!(!chain.is_empty());
        assert_eq!(chain.last().unwrap().kind(), "translation_unit");
    }

    #[test]
    fn test_node_text_lossy() {
        let mut src = b"int x = ".to_vec();
        src.extend_from_slice(&[0xff, 0xfe]);
        src.extend_from_slice(b";");
        let file = ParsedFile::parse(src, Language::C).unwrap();
        // Decoding the whole root never fails, replacement chars included.
        let text = node_text(file.root(), file.source());
        assert!(text.contains('\u{FFFD}'));
    }
}
