//! Grammar and query registry
//!
//! Process-wide read-through caches for tree-sitter grammars and compiled
//! query patterns. Grammars are static, so entries live for the process
//! lifetime and need no invalidation. Lazy population races on first load
//! are resolved by the `OnceLock`/`Mutex` pair; a duplicate initial compile
//! is wasted work, never corruption.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tree_sitter::{Parser, Query};

use super::Language;
use crate::error::{Error, Result};

static QUERY_CACHE: OnceLock<Mutex<HashMap<(Language, &'static str), Arc<Query>>>> =
    OnceLock::new();

/// The tree-sitter grammar for a language.
pub fn grammar(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
    }
}

/// A fresh parser bound to the language's grammar.
///
/// Parsers hold mutable parse state, so callers get their own instance;
/// the grammar behind it is shared.
pub fn parser(lang: Language) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar(lang))
        .map_err(|e| Error::Grammar {
            lang: lang.name(),
            message: e.to_string(),
        })?;
    Ok(parser)
}

/// Compile a query pattern against a language, caching the result.
///
/// The cache key is (language, pattern text); patterns are `'static`
/// constants from [`super::queries`].
pub fn query(lang: Language, pattern: &'static str) -> Result<Arc<Query>> {
    let cache = QUERY_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().expect("query cache poisoned");
    if let Some(compiled) = cache.get(&(lang, pattern)) {
        return Ok(Arc::clone(compiled));
    }
    let compiled = Arc::new(Query::new(&grammar(lang), pattern).map_err(|e| Error::Query {
        lang: lang.name(),
        message: e.to_string(),
    })?);
    cache.insert((lang, pattern), Arc::clone(&compiled));
    Ok(compiled)
}
