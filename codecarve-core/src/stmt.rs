//! Line-to-statement mapping
//!
//! Maps each source line to the statement nodes that span it, for
//! line-granularity lookups downstream. Any node whose kind contains
//! "statement" counts except the generic compound block; a one-line `if`
//! containing a call therefore lands two entries on its line.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::tree::collect_nodes;

fn is_statement(node: Node<'_>) -> bool {
    node.kind().contains("statement") && node.kind() != "compound_statement"
}

/// Map of 1-based line number to the statement nodes covering that line.
pub fn stmt_map<'a>(node: Node<'a>) -> HashMap<usize, Vec<Node<'a>>> {
    let mut map: HashMap<usize, Vec<Node<'a>>> = HashMap::new();
    for stmt in collect_nodes(node, |_| true, is_statement) {
        for line in stmt.start_position().row..=stmt.end_position().row {
            map.entry(line + 1).or_default().push(stmt);
        }
    }
    map
}
