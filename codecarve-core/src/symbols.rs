//! Known-symbol reference data
//!
//! Two flat name lists — system/platform calls and C standard library
//! calls — compiled in and merged into one set at first use. Consulted
//! only by the keep-known policy for called-function abstraction: calls
//! into these names stay recognizable while project-local calls collapse
//! to a placeholder.

use std::collections::HashSet;
use std::sync::OnceLock;

static KNOWN_FUNCTIONS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// The merged system + standard library symbol set.
pub fn known_functions() -> &'static HashSet<&'static str> {
    KNOWN_FUNCTIONS.get_or_init(|| {
        include_str!("../data/sys_func.txt")
            .lines()
            .chain(include_str!("../data/std_func.txt").lines())
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.starts_with('#'))
            .collect()
    })
}

/// Whether a called name is a known standard/system symbol.
pub fn is_known_function(name: &str) -> bool {
    known_functions().contains(name)
}
