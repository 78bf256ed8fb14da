//! Java grammar configuration.

use tree_sitter::Language;

use crate::parser::GrammarAdapter;

pub struct JavaGrammar {
    language: Language,
}

impl JavaGrammar {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }
}

impl Default for JavaGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarAdapter for JavaGrammar {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn language(&self) -> &Language {
        &self.language
    }
}
