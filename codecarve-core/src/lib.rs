//! Codecarve core library - function extraction and identifier
//! abstraction for C, C++, and Java
//!
//! Parses source files into concrete syntax trees, carves out function
//! definitions, and derives the normalized representations used by
//! code-clone and vulnerability-signature matching: faithful function
//! records (boundaries, qualified name, raw text) and abstracted token
//! streams where identifiers, literals, types, and calls are selectively
//! replaced by placeholders.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Extraction and abstraction are strictly per-function
// - No global mutable state beyond the read-through grammar/query caches
// - Deterministic traversal order must be explicit
// - Identical input bytes yield byte-for-byte identical boundaries
// - Placeholder numbering never leaks across abstraction runs

pub mod abstraction;
pub mod comments;
pub mod deadline;
pub mod error;
pub mod explode;
pub mod language;
pub mod locate;
pub mod names;
pub mod parse;
pub mod record;
pub mod scope;
pub mod similarity;
pub mod stmt;
pub mod symbols;
pub mod tokens;
pub mod tree;

pub use abstraction::{abstract_function, abstract_source, AbstractionMode, AbstractionPolicy};
pub use comments::{normalize, strip_comments, CommentStrategy};
pub use deadline::Deadline;
pub use error::{Error, Result};
pub use explode::{explode, explode_with_classifier, ExplodeOptions, ExplodeSummary};
pub use language::Language;
pub use locate::ExtractOptions;
pub use parse::ParsedFile;
pub use record::{FunctionRecord, FunctionSummary};

/// Parse a buffer and return owned summaries of every function in it.
///
/// Convenience wrapper for callers that do not need to hold the parse
/// tree; use [`ParsedFile::functions`] for borrowing records.
pub fn extract_summaries(
    src: &[u8],
    lang: Language,
    opts: &ExtractOptions,
) -> Result<Vec<FunctionSummary>> {
    let file = ParsedFile::parse(src.to_vec(), lang)?;
    let records = file.functions(opts)?;
    Ok(records.iter().map(FunctionRecord::summary).collect())
}
