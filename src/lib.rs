//! migrascope - C++ to Java migration analysis.
//!
//! Parses C++ and Java sources with tree-sitter into a normalized model
//! (variables, fields, methods, parameters, constructor initializer lists,
//! call sites) and runs two analyses over it:
//!
//! - receiver type resolution for `obj.method()` / `ptr->method()` calls,
//!   searching locals, parameters, member initializers and globals in order
//! - field equivalence scoring between a C++ struct or class and a Java
//!   candidate class
//!
//! # Architecture
//!
//! - `parser`: grammar adapters and the caller-owned `ParseContext`
//! - `extract`: single-pass structural extractors for C++ and Java
//! - `parent`: parent-class fallback for classes with no variables
//! - `resolve`: four-tier receiver type resolution
//! - `similarity` / `score`: name normalization and equivalence scoring
//! - `config`: YAML configuration
//! - `report`: output formatting (JSON, pretty)

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod parent;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod score;
pub mod similarity;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::{CppExtractor, JavaExtractor, TypeSpec};
pub use model::{
    CallSite, ExtractedModel, FieldRecord, FileModel, MemberInitializerBinding, MethodSignature,
    Parameter, ParentInfo, VariableDeclaration,
};
pub use parent::{resolve_with_parent_fallback, FallbackOptions, SpliceMode};
pub use parser::{GrammarAdapter, ParseContext, ParsedSource};
pub use resolve::{
    resolve_all, resolve_call_site_type, LookupStrategy, ResolutionSummary, ResolvedCall,
    TypeResolutionReport,
};
pub use score::{
    rank_candidates, score, score_files, EquivalenceReport, EquivalenceScore, MatchRecord, Verdict,
};
