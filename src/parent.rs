//! Parent-class fallback.
//!
//! A class that declares no variables of its own often inherits them. When
//! direct extraction comes back empty, the first base class is looked up as
//! `<Base>.h` under a search root and its model is spliced in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::extract::{self, CppExtractor};
use crate::model::{ExtractedModel, FileModel, ParentInfo};
use crate::parser::languages::BASE_CLASS_QUERY;
use crate::parser::{self, ParseContext, ParsedSource};

pub const PARENT_NOT_FOUND: &str = "Parent header file not found";

/// Which parent collections are copied into the child model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceMode {
    /// Only `variables`.
    #[default]
    Variables,
    /// Every collection of the parent model, replacing the child's own.
    Complete,
}

impl FromStr for SpliceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "variables" => Ok(SpliceMode::Variables),
            "complete" => Ok(SpliceMode::Complete),
            other => Err(format!(
                "unknown splice mode '{}' (expected variables or complete)",
                other
            )),
        }
    }
}

impl fmt::Display for SpliceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceMode::Variables => f.write_str("variables"),
            SpliceMode::Complete => f.write_str("complete"),
        }
    }
}

/// Options for [`resolve_with_parent_fallback`].
#[derive(Debug, Clone)]
pub struct FallbackOptions {
    /// Directory searched recursively for the parent header.
    pub search_root: PathBuf,
    pub splice: SpliceMode,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            search_root: PathBuf::from("."),
            splice: SpliceMode::default(),
        }
    }
}

/// Unqualified name of the first base class of the first class or struct
/// that has a base clause.
pub fn parent_class_name(parsed: &ParsedSource) -> Result<Option<String>> {
    let query = Query::new(parser::cpp().language(), BASE_CLASS_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, parsed.tree.root_node(), parsed.source.as_slice());

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let clause = capture.node;
            let base = clause
                .children(&mut clause.walk())
                .find_map(|child| class_name(parsed, child));
            if base.is_some() {
                return Ok(base);
            }
        }
    }

    Ok(None)
}

fn class_name(parsed: &ParsedSource, node: Node) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(parsed.node_text(node).to_string()),
        // `ns::Base` -> `Base`, `Base<T>` -> `Base`
        "qualified_identifier" | "template_type" => {
            class_name(parsed, node.child_by_field_name("name")?)
        }
        _ => None,
    }
}

/// Find `<class_name>.h` under `root`.
///
/// Depth-first, with the entries of each directory visited in file name
/// order so the first match does not depend on the file system.
pub fn find_header_file(class_name: &str, root: &Path) -> Option<PathBuf> {
    let wanted = format!("{}.h", class_name);

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| e.file_name().to_str() == Some(wanted.as_str()))
        .map(|e| e.into_path())
}

/// Extract a C++ file, falling back to its parent class when the file
/// declares no variables of its own.
///
/// Only a failure to read `path` itself is an error. Problems with the
/// parent are recorded in `parent_info.error`.
pub fn resolve_with_parent_fallback(
    ctx: &mut ParseContext,
    path: &Path,
    options: &FallbackOptions,
) -> Result<FileModel> {
    let source = extract::read_source(path)?;
    let parsed = extract::parse_cpp(ctx, &path.to_string_lossy(), &source)?;
    let mut file_model = FileModel {
        current_file: path.to_string_lossy().into_owned(),
        model: CppExtractor::new(&parsed).extract(),
    };

    if file_model.model.variables.is_empty() {
        file_model.model.parent_info = fallback(ctx, &parsed, options)?;
        file_model.splice_parent(options.splice);
    }

    Ok(file_model)
}

fn fallback(
    ctx: &mut ParseContext,
    parsed: &ParsedSource,
    options: &FallbackOptions,
) -> Result<Option<ParentInfo>> {
    let Some(parent_class) = parent_class_name(parsed)? else {
        tracing::debug!(path = %parsed.path, "no variables and no base class");
        return Ok(None);
    };

    let Some(parent_path) = find_header_file(&parent_class, &options.search_root) else {
        tracing::debug!(
            parent = %parent_class,
            root = %options.search_root.display(),
            "parent header not found"
        );
        return Ok(Some(ParentInfo {
            parent_class,
            parent_file: None,
            parent_model: None,
            error: Some(PARENT_NOT_FOUND.to_string()),
        }));
    };
    let parent_file = parent_path.to_string_lossy().into_owned();

    let parent_model = match extract::extract_cpp_file(ctx, &parent_path) {
        Ok(model) => model,
        Err(e) => {
            let cause = match &e {
                Error::Read { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            tracing::debug!(parent = %parent_class, error = %cause, "parent header unreadable");
            return Ok(Some(ParentInfo {
                parent_class,
                parent_file: Some(parent_file),
                parent_model: None,
                error: Some(format!("Error reading parent file: {}", cause)),
            }));
        }
    };

    tracing::debug!(
        parent = %parent_class,
        file = %parent_file,
        variables = parent_model.variables.len(),
        "spliced parent model"
    );

    Ok(Some(ParentInfo {
        parent_class,
        parent_file: Some(parent_file),
        parent_model: Some(Box::new(parent_model)),
        error: None,
    }))
}

impl FileModel {
    /// Copy the parent's collections into this model according to `mode`.
    /// Does nothing without a successfully loaded parent.
    pub fn splice_parent(&mut self, mode: SpliceMode) {
        let Some(parent) = self
            .model
            .parent_info
            .as_ref()
            .and_then(|p| p.parent_model.as_deref())
            .cloned()
        else {
            return;
        };
        splice(&mut self.model, parent, mode);
    }
}

fn splice(model: &mut ExtractedModel, parent: ExtractedModel, mode: SpliceMode) {
    model.variables = parent.variables;
    if mode == SpliceMode::Complete {
        model.methods = parent.methods;
        model.member_initializer_variables = parent.member_initializer_variables;
        model.method_invocations = parent.method_invocations;
        model.method_local_variables = parent.method_local_variables;
    }
}
