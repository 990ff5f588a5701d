//! Comment removal and text normalization
//!
//! Two interchangeable strategies. The regex strategy scans raw text with
//! one pattern covering `//` comments, `/* */` comments, and quoted string
//! literals — strings are matched so comment-like sequences inside them
//! survive, and comment matches become a single space so adjacent tokens
//! never merge. The tree strategy deletes exact comment-node byte spans
//! and re-emits their newlines, so line numbers of surrounding code do not
//! shift. All three supported grammars share C comment syntax, so the
//! regex fast path is the default for each.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;
use regex::Regex;

use crate::error::Result;
use crate::language::Language;
use crate::parse::ParsedFile;
use crate::tree::{collect_nodes, is_leaf};

/// How comments are removed for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStrategy {
    /// Single-pattern text scan; fast, language-approximate.
    Regex,
    /// Exact comment-node spans from a parse; preserves line numbers.
    Tree,
}

impl Language {
    /// The default stripping strategy for this grammar.
    ///
    /// C, C++, and Java share comment and string syntax, so the regex
    /// scan is safe for all of them.
    pub fn comment_strategy(&self) -> CommentStrategy {
        CommentStrategy::Regex
    }
}

fn rx_clike_comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Comment alternatives first, then string literals (escape-aware)
        // so quotes inside strings cannot start a false comment match.
        Regex::new(r#"(?ms)//.*?$|/\*.*?\*/|'(?:\\.|[^\\'])*'|"(?:\\.|[^\\"])*""#).unwrap()
    })
}

/// Remove comments with the single-pattern text scan.
///
/// String-literal matches are returned unchanged; comment matches become
/// one space.
pub fn strip_comments_regex(code: &str) -> String {
    rx_clike_comment()
        .replace_all(code, |caps: &regex::Captures<'_>| {
            let m = &caps[0];
            if m.starts_with('/') {
                " ".to_string()
            } else {
                m.to_string()
            }
        })
        .into_owned()
}

/// Remove comments by deleting exact comment-node byte spans.
///
/// Each span is replaced with as many newlines as it contained, so every
/// remaining byte keeps its original line number.
pub fn strip_comments_tree(code: &[u8], lang: Language) -> Result<Vec<u8>> {
    let file = ParsedFile::parse(code.to_vec(), lang)?;
    // Preorder keeps spans in ascending document order; comment nodes
    // never nest.
    let comments = collect_nodes(
        file.root(),
        |_| true,
        |n| {
            matches!(n.kind(), "comment" | "line_comment" | "block_comment")
                && n.start_byte() < n.end_byte()
        },
    );

    let mut out = Vec::with_capacity(code.len());
    let mut last = 0;
    for node in comments {
        let (start, end) = (node.start_byte(), node.end_byte());
        out.extend_from_slice(&code[last..start]);
        let newlines = code[start..end].iter().filter(|&&b| b == b'\n').count();
        out.extend(std::iter::repeat(b'\n').take(newlines));
        last = end;
    }
    out.extend_from_slice(&code[last..]);
    Ok(out)
}

/// Remove comments using the given strategy.
pub fn strip_comments(code: &str, lang: Language, strategy: CommentStrategy) -> Result<String> {
    match strategy {
        CommentStrategy::Regex => Ok(strip_comments_regex(code)),
        CommentStrategy::Tree => {
            let out = strip_comments_tree(code.as_bytes(), lang)?;
            Ok(String::from_utf8_lossy(&out).into_owned())
        }
    }
}

/// Normalize text before structural comparison: tabs become four spaces
/// and trailing whitespace is stripped from every line.
pub fn normalize(code: &str) -> String {
    let code = code.replace('\t', "    ");
    let mut out = String::with_capacity(code.len());
    for line in split_lines(&code) {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Split on `\r\n` or `\n`, keeping empty trailing segments.
pub fn split_lines(s: &str) -> impl Iterator<Item = &str> {
    s.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

fn split_lines_bytes(s: &[u8]) -> impl Iterator<Item = &[u8]> {
    s.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

const COMMENT_CACHE_CAPACITY: usize = 128;

type CommentRangeCache = LruCache<(u64, Language), Arc<Vec<(usize, usize)>>>;

static COMMENT_RANGES: OnceLock<Mutex<CommentRangeCache>> = OnceLock::new();

fn hash_source(src: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish()
}

/// Line ranges (1-based, both ends inclusive) of comments that start a
/// line, i.e. have only whitespace before them.
///
/// Results are kept in a bounded LRU keyed by source hash and language so
/// repeated lookups over the same buffer do not re-parse.
pub fn comment_line_ranges(src: &[u8], lang: Language) -> Result<Arc<Vec<(usize, usize)>>> {
    let key = (hash_source(src), lang);
    let cache = COMMENT_RANGES.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(COMMENT_CACHE_CAPACITY).expect("nonzero capacity"),
        ))
    });

    if let Some(ranges) = cache.lock().expect("comment cache poisoned").get(&key) {
        return Ok(Arc::clone(ranges));
    }

    let lines: Vec<&[u8]> = split_lines_bytes(src).collect();
    let file = ParsedFile::parse(src.to_vec(), lang)?;
    let leaves = collect_nodes(file.root(), |_| true, is_leaf);

    let mut ranges = Vec::new();
    for node in leaves {
        if !node.kind().contains("comment") {
            continue;
        }
        let row = node.start_position().row;
        let col = node.start_position().column;
        let leading = lines
            .get(row)
            .map(|line| &line[..col.min(line.len())])
            .unwrap_or(&[]);
        if leading.iter().all(|b| b.is_ascii_whitespace()) {
            ranges.push((row + 1, node.end_position().row + 1));
        }
    }

    let ranges = Arc::new(ranges);
    cache
        .lock()
        .expect("comment cache poisoned")
        .put(key, Arc::clone(&ranges));
    Ok(ranges)
}
