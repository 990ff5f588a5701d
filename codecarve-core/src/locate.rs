//! Function definition capture
//!
//! Runs the per-language function-definition query over a tree, prunes
//! captures nested inside other captures, and rejects grammar mis-captures
//! whose text begins with a control-flow keyword. Output is document
//! order; no two returned nodes overlap.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor};

use crate::deadline::Deadline;
use crate::error::Result;
use crate::language::{queries, registry, Language};
use crate::tree::node_bytes;

/// Control-flow keywords that occasionally prefix a false function
/// capture when braces follow a keyword statement. The list is fixed; it
/// deliberately matches by raw byte prefix, exactly as downstream
/// signature consumers expect.
const CONTROL_KEYWORD_PREFIXES: &[&[u8]] = &[
    b"else", b"if", b"for", b"while", b"do", b"switch", b"case", b"default",
];

/// Options for one extraction pass.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Keep captures whose subtree contains a parse error node.
    pub keep_error_nodes: bool,
    /// Cooperative deadline checked between captures.
    pub deadline: Deadline,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            keep_error_nodes: true,
            deadline: Deadline::none(),
        }
    }
}

/// Whether text starts with one of the rejected control keywords.
pub fn starts_with_control_keyword(text: &[u8]) -> bool {
    CONTROL_KEYWORD_PREFIXES
        .iter()
        .any(|kw| text.starts_with(kw))
}

/// Locate all function definitions under `root`, in source order.
pub fn locate_functions<'a>(
    root: Node<'a>,
    src: &[u8],
    lang: Language,
    opts: &ExtractOptions,
) -> Result<Vec<Node<'a>>> {
    let query = registry::query(lang, queries::function_definitions(lang))?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, src);

    let mut captured: Vec<Node<'a>> = Vec::new();
    while let Some(m) = matches.next() {
        opts.deadline.check()?;
        for capture in m.captures {
            captured.push(capture.node);
        }
    }

    // Query match order follows pattern order, not document order.
    captured.sort_by_key(|n| (n.start_byte(), n.end_byte()));
    captured.dedup_by_key(|n| n.id());

    // Keep only outermost spans: a capture strictly inside another is a
    // nested definition (lambda, local class method) and the outer
    // boundary wins.
    let outermost: Vec<Node<'a>> = captured
        .iter()
        .filter(|n| {
            !captured.iter().any(|outer| {
                n.start_byte() > outer.start_byte() && n.end_byte() < outer.end_byte()
            })
        })
        .copied()
        .collect();

    let mut result = Vec::with_capacity(outermost.len());
    for node in outermost {
        opts.deadline.check()?;
        if starts_with_control_keyword(node_bytes(node, src)) {
            continue;
        }
        if !opts.keep_error_nodes && node.has_error() {
            continue;
        }
        result.push(node);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parse::ParsedFile;
    use std::time::Duration;

    fn locate(src: &str, lang: Language) -> Vec<(usize, usize)> {
        let file = ParsedFile::parse(src.as_bytes().to_vec(), lang).unwrap();
        locate_functions(file.root(), file.source(), lang, &ExtractOptions::default())
            .unwrap()
            .iter()
            .map(|n| (n.start_byte(), n.end_byte()))
            .collect()
    }

    #[test]
    fn test_c_functions_in_source_order() {
        let spans = locate("int a() { return 1; }\nint b() { return 2; }\n", Language::C);
        assert_eq!(spans.len(), 2);
        assert!(spans[0].1 <= spans[1].0);
    }

    #[test]
    fn test_cpp_lambda_inside_function_not_duplicated() {
        let src = r#"
int outer() {
    auto f = [](int v) { return v + 1; };
    return f(1);
}
"#;
        let spans = locate(src, Language::Cpp);
        assert_eq!(spans.len(), 1, "only the outermost definition survives");
    }

    #[test]
    fn test_cpp_local_class_method_pruned() {
        let src = r#"
void outer() {
    struct Local {
        int method() { return 3; }
    };
    Local l;
}
"#;
        let spans = locate(src, Language::Cpp);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_spans_never_overlap() {
        let src = r#"
namespace n {
class K {
public:
    int m() { return [] { return 0; }(); }
};
int free_fn() { return 1; }
}
"#;
        let spans = locate(src, Language::Cpp);
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "overlapping spans {pair:?}");
        }
    }

    #[test]
    fn test_java_methods_and_constructors() {
        let src = r#"
class Point {
    Point(int x) { this.x = x; }
    int getX() { return x; }
    private int x;
}
"#;
        let spans = locate(src, Language::Java);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_control_keyword_prefix_filter() {
        assert!(starts_with_control_keyword(b"if (x) {}"));
        assert!(starts_with_control_keyword(b"else {}"));
        assert!(starts_with_control_keyword(b"default: {}"));
        assert!(starts_with_control_keyword(b"switch (v) {}"));
        // Prefix match is deliberate: no word-boundary check.
        assert!(starts_with_control_keyword(b"iffy()"));
        assert!(!starts_with_control_keyword(b"int main() {}"));
        assert!(!starts_with_control_keyword(b"goto_handler() {}"));
    }

    #[test]
    fn test_drop_error_nodes_flag() {
        let src = "int broken( { return; }\nint fine() { return 0; }\n";
        let file = ParsedFile::parse(src.as_bytes().to_vec(), Language::C).unwrap();

        let kept = locate_functions(
            file.root(),
            file.source(),
            Language::C,
            &ExtractOptions::default(),
        )
        .unwrap();
        let dropped = locate_functions(
            file.root(),
            file.source(),
            Language::C,
            &ExtractOptions {
                keep_error_nodes: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(dropped.len() <= kept.len());
        for node in &dropped {
            assert!(!node.has_error());
        }
    }

    #[test]
    fn test_expired_deadline_is_timeout() {
        let file =
            ParsedFile::parse(b"int a() { return 1; }".to_vec(), Language::C).unwrap();
        let opts = ExtractOptions {
            deadline: Deadline::after(Duration::ZERO),
            ..Default::default()
        };
        let err = locate_functions(file.root(), file.source(), Language::C, &opts).unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[test]
    fn test_comment_only_file_has_no_functions() {
        assert!(locate("// only a comment\n", Language::C).is_empty());
    }
}
