//! Normalized source model shared by the extractors, the type resolver and
//! the equivalence scorer.
//!
//! Field names serialize in snake_case and match the JSON documents the
//! surrounding tooling already exchanges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel type for member initializers whose parameter type is unknown.
pub const MEMBER_VARIABLE_SENTINEL: &str = "member_variable";

/// A variable, local, or field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    /// Empty when a hand-written model leaves the type out.
    #[serde(rename = "type", default)]
    pub var_type: String,
    /// Line number (1-indexed).
    #[serde(default)]
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialization: Option<String>,
}

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub param_type: String,
    /// Empty when the grammar gives no name (e.g. `void f(int)`).
    #[serde(default)]
    pub name: String,
}

/// A function or method definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Name as written, possibly qualified (`Ns::Class::method`).
    pub name: String,
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub line_start: usize,
    pub line_end: usize,
}

impl MethodSignature {
    /// Find a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A call expression inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Raw call target text: `run`, `obj.run`, `ptr->run`, `ns::run`.
    pub method_name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    pub line: usize,
}

/// One `member(expr)` entry of a constructor's initializer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInitializerBinding {
    pub name: String,
    /// Type of the matching constructor parameter, or
    /// [`MEMBER_VARIABLE_SENTINEL`].
    #[serde(rename = "type")]
    pub var_type: String,
    pub initialization: String,
    pub line: usize,
}

/// Result of looking for a class's parent header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentInfo {
    pub parent_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_model: Option<Box<ExtractedModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything the structural extractor pulls out of one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedModel {
    /// Global and class-level variables and struct/class fields.
    #[serde(default)]
    pub variables: Vec<VariableDeclaration>,
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
    #[serde(default)]
    pub member_initializer_variables: Vec<MemberInitializerBinding>,
    /// Call sites keyed by enclosing method name.
    #[serde(default)]
    pub method_invocations: BTreeMap<String, Vec<CallSite>>,
    /// Local declarations keyed by enclosing method name.
    #[serde(default)]
    pub method_local_variables: BTreeMap<String, Vec<VariableDeclaration>>,
    #[serde(default)]
    pub parent_info: Option<ParentInfo>,
}

impl ExtractedModel {
    /// Methods with the given name, in declaration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodSignature> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Local declarations recorded for a method.
    pub fn locals_of(&self, method: &str) -> &[VariableDeclaration] {
        self.method_local_variables
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// An extracted model tagged with the file it came from.
///
/// This is the document `migrascope extract` writes and `migrascope resolve`
/// reads back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileModel {
    pub current_file: String,
    #[serde(flatten)]
    pub model: ExtractedModel,
}

/// A Java field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<String>>,
}
