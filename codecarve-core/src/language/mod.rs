//! Language detection and grammar dispatch
//!
//! The supported language set is closed: C, C++, and Java. Adding a
//! language means registering its grammar and query patterns here and in
//! [`registry`] — never scattering per-language branches across other
//! components.

pub mod queries;
pub mod registry;

use std::path::Path;

use crate::error::{Error, Result};

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    /// C (.c, .h)
    C,
    /// C++ (.cc, .cpp, .cxx, .hh, .hpp, .hxx)
    Cpp,
    /// Java (.java)
    Java,
}

/// All supported languages, in a fixed order.
pub const ALL_LANGUAGES: &[Language] = &[Language::C, Language::Cpp, Language::Java];

impl Language {
    /// Resolve a language tag as used by external classifiers.
    ///
    /// Unknown tags fail with [`Error::LanguageNotSupported`] carrying the
    /// requested tag.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "C" | "c" => Ok(Language::C),
            "C++" | "c++" | "cpp" | "Cpp" => Ok(Language::Cpp),
            "Java" | "java" => Ok(Language::Java),
            _ => Err(Error::LanguageNotSupported {
                lang: name.to_string(),
            }),
        }
    }

    /// Detect language from a file extension (without the dot).
    ///
    /// Returns `None` if the extension is not recognized. Headers map to C;
    /// callers that know better can classify externally and use
    /// [`Language::from_name`].
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" | "h" => Some(Language::C),
            "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    /// Detect language from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical name of the language, matching classifier output.
    pub fn name(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
        }
    }

    /// File extensions conventionally used by this language.
    pub fn extensions(&self) -> &[&'static str] {
        match self {
            Language::C => &["c", "h"],
            Language::Cpp => &["cc", "cpp", "cxx", "hh", "hpp", "hxx"],
            Language::Java => &["java"],
        }
    }

    /// Whether qualified names (`A::B::foo`) exist in this language.
    ///
    /// Only the scope-bearing language joins scope and name in `fullname`.
    pub fn has_qualified_names(&self) -> bool {
        matches!(self, Language::Cpp)
    }
}
