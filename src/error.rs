//! Error types for migrascope.

use std::path::PathBuf;

/// Errors raised at the library boundary.
///
/// Recoverable conditions (missing parent header, empty field lists,
/// unresolved receivers) never show up here; they are reported as fields of
/// the result types instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error reading file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {language} grammar: {source}")]
    Language {
        language: &'static str,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("Parse failed for {language} source: {path}")]
    Parse { language: &'static str, path: String },

    #[error("Invalid tree-sitter query: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(f64),

    #[error("Invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a read error for `path`.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }
}
