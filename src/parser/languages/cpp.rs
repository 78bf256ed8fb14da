//! C++ grammar configuration.

use tree_sitter::Language;

use crate::parser::GrammarAdapter;

/// Tree-sitter query for base class clauses.
///
/// Captures:
/// - `bases`: the `base_class_clause` of a class or struct
pub const BASE_CLASS_QUERY: &str = r#"
(class_specifier (base_class_clause) @bases)
(struct_specifier (base_class_clause) @bases)
"#;

pub struct CppGrammar {
    language: Language,
}

impl CppGrammar {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

impl Default for CppGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarAdapter for CppGrammar {
    fn language_id(&self) -> &'static str {
        "cpp"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["h", "hh", "hpp", "hxx", "cpp", "cc", "cxx"]
    }

    fn language(&self) -> &Language {
        &self.language
    }
}
