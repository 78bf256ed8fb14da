//! Structural extraction of C++ and Java sources into the shared model.
//!
//! The walkers in `cpp` and `java` operate on an already parsed tree; the
//! helpers here read and parse through a caller-owned [`ParseContext`].

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{ExtractedModel, FieldRecord};
use crate::parser::{self, ParseContext, ParsedSource};

mod cpp;
mod java;
pub mod kinds;
pub mod types;

pub use cpp::CppExtractor;
pub use java::JavaExtractor;
pub use types::TypeSpec;

/// Read a source file as UTF-8. Invalid encoding surfaces as [`Error::Read`].
pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::read(path, e))
}

/// Parse C++ source text.
pub fn parse_cpp(ctx: &mut ParseContext, path: &str, source: &str) -> Result<ParsedSource> {
    ctx.parse(parser::cpp(), path, source.as_bytes())
}

/// Parse Java source text.
pub fn parse_java(ctx: &mut ParseContext, path: &str, source: &str) -> Result<ParsedSource> {
    ctx.parse(parser::java(), path, source.as_bytes())
}

/// Extract the model of C++ source text.
pub fn extract_cpp(ctx: &mut ParseContext, source: &str) -> Result<ExtractedModel> {
    let parsed = parse_cpp(ctx, "<memory>", source)?;
    Ok(CppExtractor::new(&parsed).extract())
}

/// Extract the model of a C++ file. Headers and implementation files are
/// both parsed with the C++ grammar regardless of extension.
pub fn extract_cpp_file(ctx: &mut ParseContext, path: &Path) -> Result<ExtractedModel> {
    let source = read_source(path)?;
    tracing::debug!(path = %path.display(), "extracting C++ model");
    let parsed = parse_cpp(ctx, &path.to_string_lossy(), &source)?;
    Ok(CppExtractor::new(&parsed).extract())
}

/// Extract the fields of Java source text.
pub fn extract_java_fields(ctx: &mut ParseContext, source: &str) -> Result<Vec<FieldRecord>> {
    let parsed = parse_java(ctx, "<memory>", source)?;
    Ok(JavaExtractor::new(&parsed).extract_fields())
}

/// Extract the fields of a Java file.
pub fn extract_java_fields_file(ctx: &mut ParseContext, path: &Path) -> Result<Vec<FieldRecord>> {
    let source = read_source(path)?;
    tracing::debug!(path = %path.display(), "extracting Java fields");
    let parsed = parse_java(ctx, &path.to_string_lossy(), &source)?;
    Ok(JavaExtractor::new(&parsed).extract_fields())
}

/// Drop fields whose name is in `ignored`.
pub fn without_ignored(fields: Vec<FieldRecord>, ignored: &[String]) -> Vec<FieldRecord> {
    fields
        .into_iter()
        .filter(|f| !ignored.iter().any(|i| i == &f.name))
        .collect()
}

/// Clear the modifiers of every field.
pub fn strip_modifiers(fields: &mut [FieldRecord]) {
    for field in fields {
        field.modifiers = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_cpp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Point.h");
        fs::write(&path, "struct Point { int x; int y; };").unwrap();

        let mut ctx = ParseContext::new();
        let model = extract_cpp_file(&mut ctx, &path).unwrap();
        assert_eq!(model.variables.len(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.cpp");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let mut ctx = ParseContext::new();
        let err = extract_cpp_file(&mut ctx, &path).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let mut ctx = ParseContext::new();
        let err = extract_java_fields_file(&mut ctx, Path::new("/nonexistent/A.java")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_ignored_and_modifiers() {
        let mut ctx = ParseContext::new();
        let fields = extract_java_fields(
            &mut ctx,
            "class A { public static final String CODEGEN_VERSION = \"1\"; private int id; }",
        )
        .unwrap();
        let mut fields = without_ignored(fields, &["CODEGEN_VERSION".to_string()]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "id");

        strip_modifiers(&mut fields);
        assert!(fields[0].modifiers.is_none());
    }
}
