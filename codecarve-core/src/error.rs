//! Error taxonomy for extraction and abstraction
//!
//! Per-function and per-file failures are isolated at batch boundaries:
//! one file timing out must never abort its siblings. Decode failures are
//! not represented here at all — node text is always decoded lossily.

use thiserror::Error;

/// Errors produced by the codecarve core.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested language tag is not in the supported set.
    ///
    /// This must propagate from every component that dispatches on
    /// language; substituting a default language is never acceptable.
    #[error("language {lang:?} is not supported")]
    LanguageNotSupported { lang: String },

    /// A grammar could not be bound to a parser.
    #[error("failed to load {lang} grammar: {message}")]
    Grammar { lang: &'static str, message: String },

    /// A query pattern failed to compile against a grammar.
    ///
    /// Query patterns are compiled-in constants, so this is a programmer
    /// error rather than a runtime condition.
    #[error("malformed {lang} query: {message}")]
    Query { lang: &'static str, message: String },

    /// The parser returned no tree for the given input.
    #[error("parser produced no tree for {lang} input")]
    Parse { lang: &'static str },

    /// A cooperative deadline expired mid-traversal.
    ///
    /// Recoverable: batch callers skip the offending input and continue.
    #[error("operation exceeded its deadline")]
    Timeout,

    /// An abstraction policy combination that has no defined behavior.
    #[error("invalid abstraction policy: {0}")]
    InvalidPolicy(&'static str),

    /// An include/exclude glob pattern failed to compile.
    #[error(transparent)]
    Glob(#[from] globset::Error),

    /// File-level I/O failure during batch extraction.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
