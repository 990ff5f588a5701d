//! Integration tests for parsing, location, and the function model

use std::path::PathBuf;

use codecarve_core::comments::strip_comments_tree;
use codecarve_core::{ExtractOptions, Language, ParsedFile};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn parse_fixture(name: &str, lang: Language) -> ParsedFile {
    let bytes = std::fs::read(fixture_path(name)).unwrap();
    ParsedFile::parse(bytes, lang).unwrap()
}

#[test]
fn test_simple_c_functions() {
    let file = parse_fixture("simple.c", Language::C);
    let funcs = file.functions(&ExtractOptions::default()).unwrap();

    assert_eq!(funcs.len(), 2);
    assert_eq!(funcs[0].name().as_deref(), Some("add"));
    assert_eq!(funcs[1].name().as_deref(), Some("bump"));
    assert_eq!(funcs[0].start_line(), 5);
    assert_eq!(funcs[0].end_line(), 7);
    // C carries no scope.
    assert!(funcs[0].scope().is_empty());
    assert_eq!(funcs[1].fullname().as_deref(), Some("bump"));
}

#[test]
fn test_nested_cpp_outermost_only() {
    let file = parse_fixture("nested.cpp", Language::Cpp);
    let funcs = file.functions(&ExtractOptions::default()).unwrap();

    // The lambda inside weigh and the local-class method inside
    // standalone are pruned; only the outermost definitions remain.
    assert_eq!(funcs.len(), 2);
    assert_eq!(funcs[0].name().as_deref(), Some("weigh"));
    assert_eq!(funcs[1].name().as_deref(), Some("standalone"));

    assert_eq!(
        funcs[0].scope(),
        vec!["outer".to_string(), "inner".to_string(), "Widget".to_string()]
    );
    assert_eq!(
        funcs[0].fullname().as_deref(),
        Some("outer::inner::Widget::weigh")
    );
    assert_eq!(funcs[1].fullname().as_deref(), Some("outer::standalone"));

    // Mutually non-overlapping, in document order.
    assert!(funcs[0].end_byte() <= funcs[1].start_byte());
}

#[test]
fn test_java_methods_and_constructor() {
    let file = parse_fixture("Methods.java", Language::Java);
    let funcs = file.functions(&ExtractOptions::default()).unwrap();

    assert_eq!(funcs.len(), 3);
    let names: Vec<Option<String>> = funcs.iter().map(|f| f.name()).collect();
    assert_eq!(names[0].as_deref(), Some("Methods"));
    assert_eq!(names[1].as_deref(), Some("accumulate"));
    assert_eq!(names[2].as_deref(), Some("peek"));

    // Java scope is the enclosing class chain, but fullname stays short.
    assert_eq!(
        funcs[2].scope(),
        vec!["Methods".to_string(), "Inner".to_string()]
    );
    assert_eq!(funcs[2].fullname().as_deref(), Some("peek"));
}

#[test]
fn test_no_capture_starts_with_control_keyword() {
    for (name, lang) in [
        ("simple.c", Language::C),
        ("nested.cpp", Language::Cpp),
        ("Methods.java", Language::Java),
    ] {
        let file = parse_fixture(name, lang);
        let funcs = file.functions(&ExtractOptions::default()).unwrap();
        for f in &funcs {
            let code = f.code();
            for kw in ["else", "if", "for", "while", "do", "switch", "case", "default"] {
                assert!(
                    !code.starts_with(kw),
                    "{name}: capture starts with {kw}: {code:.40}"
                );
            }
        }
    }
}

#[test]
fn test_comment_only_file() {
    let file = parse_fixture("comments_only.c", Language::C);
    let funcs = file.functions(&ExtractOptions::default()).unwrap();
    assert!(funcs.is_empty());

    let stripped = strip_comments_tree(file.source(), Language::C).unwrap();
    assert_eq!(stripped, b"\n", "a single blank line, count preserved");
}

#[test]
fn test_extraction_is_deterministic() {
    let bytes = std::fs::read(fixture_path("nested.cpp")).unwrap();

    let run = |bytes: &[u8]| -> Vec<(usize, usize, Option<String>)> {
        let file = ParsedFile::parse(bytes.to_vec(), Language::Cpp).unwrap();
        file.functions(&ExtractOptions::default())
            .unwrap()
            .iter()
            .map(|f| (f.start_byte(), f.end_byte(), f.fullname()))
            .collect()
    };

    assert_eq!(run(&bytes), run(&bytes));
}

#[test]
fn test_equality_across_formatting() {
    let a = ParsedFile::parse(b"int foo(){return 1;}".to_vec(), Language::C).unwrap();
    let b = ParsedFile::parse(
        b"int  foo ( ) {\n  return 1; // x\n}".to_vec(),
        Language::C,
    )
    .unwrap();
    let fa = a.functions(&ExtractOptions::default()).unwrap();
    let fb = b.functions(&ExtractOptions::default()).unwrap();
    assert!(fa[0] == fb[0]);
}

#[test]
fn test_statement_map_lines() {
    let file = parse_fixture("simple.c", Language::C);
    let funcs = file.functions(&ExtractOptions::default()).unwrap();
    let map = funcs[1].stmt_map();

    // bump's body: lines 11-13 each hold at least one statement.
    for line in 11..=13 {
        assert!(map.contains_key(&line), "line {line} missing from map");
    }
}
