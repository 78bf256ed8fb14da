//! Grammar adapters and parsing.
//!
//! This module provides:
//! - `GrammarAdapter` trait: the tree-sitter grammar for one source language
//! - `ParseContext`: caller-owned cache of configured tree-sitter parsers
//! - `ParsedSource`: a parse tree together with the bytes it was built from
//!
//! Adapters are immutable and shared. Parsers are not `Sync`, so they live in
//! a `ParseContext` that each caller (or each worker thread) owns.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tree_sitter::{Language, Node, Parser as TsParser, Tree};

use crate::error::{Error, Result};

pub mod languages;

pub use languages::{cpp, for_extension, for_id, for_path, java, CppGrammar, JavaGrammar};

/// A tree-sitter grammar for one source language.
pub trait GrammarAdapter: Send + Sync {
    /// Returns the language identifier (e.g., "cpp", "java").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this grammar handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Returns the tree-sitter language.
    fn language(&self) -> &Language;

    /// Check if this grammar handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

/// Holds a parsed tree-sitter tree and the source it was parsed from.
pub struct ParsedSource {
    /// The tree-sitter parse tree.
    pub tree: Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path, or a placeholder for in-memory sources.
    pub path: String,
}

impl ParsedSource {
    /// Get the source code as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// 1-based line where the node starts.
    pub fn line_of(node: Node) -> usize {
        node.start_position().row + 1
    }

    /// 1-based line where the node ends.
    pub fn end_line_of(node: Node) -> usize {
        node.end_position().row + 1
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Caller-owned set of configured parsers, one per grammar.
///
/// Pass a context into every extraction call. Two contexts never share a
/// parser, so independent analyses can run on different threads.
#[derive(Default)]
pub struct ParseContext {
    parsers: HashMap<&'static str, TsParser>,
}

impl ParseContext {
    /// Create an empty context. Parsers are configured on first use.
    pub fn new() -> Self {
        Self::default()
    }

    fn parser_for(&mut self, grammar: &dyn GrammarAdapter) -> Result<&mut TsParser> {
        let id = grammar.language_id();
        match self.parsers.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut parser = TsParser::new();
                parser
                    .set_language(grammar.language())
                    .map_err(|source| Error::Language {
                        language: id,
                        source,
                    })?;
                Ok(entry.insert(parser))
            }
        }
    }

    /// Parse source bytes with the given grammar.
    ///
    /// Malformed source still produces a tree (with ERROR nodes); only a
    /// parser that returns no tree at all is an error.
    pub fn parse(
        &mut self,
        grammar: &dyn GrammarAdapter,
        path: &str,
        source: &[u8],
    ) -> Result<ParsedSource> {
        let parser = self.parser_for(grammar)?;
        let tree = parser.parse(source, None).ok_or_else(|| Error::Parse {
            language: grammar.language_id(),
            path: path.to_string(),
        })?;

        let parsed = ParsedSource {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        };
        if parsed.has_errors() {
            tracing::debug!(path, language = grammar.language_id(), "parse tree contains errors");
        }
        Ok(parsed)
    }
}
