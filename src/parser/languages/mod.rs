//! Grammar registry.

mod cpp;
mod java;

pub use cpp::{CppGrammar, BASE_CLASS_QUERY};
pub use java::JavaGrammar;

use super::GrammarAdapter;
use once_cell::sync::Lazy;
use std::path::Path;

/// Static storage for the C++ grammar.
static CPP_GRAMMAR: Lazy<CppGrammar> = Lazy::new(CppGrammar::new);

/// Static storage for the Java grammar.
static JAVA_GRAMMAR: Lazy<JavaGrammar> = Lazy::new(JavaGrammar::new);

/// The C++ grammar.
pub fn cpp() -> &'static dyn GrammarAdapter {
    &*CPP_GRAMMAR
}

/// The Java grammar.
pub fn java() -> &'static dyn GrammarAdapter {
    &*JAVA_GRAMMAR
}

/// Get a grammar for the given file extension (without dot).
///
/// Returns None if no grammar handles the extension.
pub fn for_extension(ext: &str) -> Option<&'static dyn GrammarAdapter> {
    if CPP_GRAMMAR.handles_extension(ext) {
        return Some(&*CPP_GRAMMAR);
    }
    if JAVA_GRAMMAR.handles_extension(ext) {
        return Some(&*JAVA_GRAMMAR);
    }
    None
}

/// Get a grammar for a path, using its extension.
pub fn for_path(path: &Path) -> Option<&'static dyn GrammarAdapter> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    for_extension(ext)
}

/// Get a grammar by language ID ("cpp" or "java").
pub fn for_id(lang_id: &str) -> Option<&'static dyn GrammarAdapter> {
    match lang_id {
        "cpp" => Some(&*CPP_GRAMMAR),
        "java" => Some(&*JAVA_GRAMMAR),
        _ => None,
    }
}
