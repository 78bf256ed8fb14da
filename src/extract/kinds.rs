//! Closed sets of tree-sitter node kinds the extractors act on.
//!
//! Anything outside these sets maps to an `Other` variant and is walked
//! through without producing model entries.

/// Node kinds the C++ traversal dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CppNode {
    FunctionDefinition,
    CallExpression,
    Declaration,
    FieldDeclaration,
    Other,
}

impl CppNode {
    pub fn classify(kind: &str) -> Self {
        match kind {
            "function_definition" => CppNode::FunctionDefinition,
            "call_expression" => CppNode::CallExpression,
            "declaration" => CppNode::Declaration,
            "field_declaration" => CppNode::FieldDeclaration,
            _ => CppNode::Other,
        }
    }
}

/// Shapes a C++ declarator can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CppDeclarator {
    /// `x`
    Identifier,
    /// `x` inside a class body
    FieldIdentifier,
    /// `x = 1`, `x(a, b)`, `x{1}`
    Init,
    /// `*x`
    Pointer,
    /// `&x`, `&&x`
    Reference,
    /// `f(int)`, or a constructor-style local `Foo x(a, b)`
    Function,
    /// `*` with no name (parameters only)
    AbstractPointer,
    /// `&` with no name (parameters only)
    AbstractReference,
    Other,
}

impl CppDeclarator {
    pub fn classify(kind: &str) -> Self {
        match kind {
            "identifier" => CppDeclarator::Identifier,
            "field_identifier" => CppDeclarator::FieldIdentifier,
            "init_declarator" => CppDeclarator::Init,
            "pointer_declarator" => CppDeclarator::Pointer,
            "reference_declarator" => CppDeclarator::Reference,
            "function_declarator" => CppDeclarator::Function,
            "abstract_pointer_declarator" => CppDeclarator::AbstractPointer,
            "abstract_reference_declarator" => CppDeclarator::AbstractReference,
            _ => CppDeclarator::Other,
        }
    }
}

/// Whether a C++ node kind names a type.
pub fn is_cpp_type(kind: &str) -> bool {
    matches!(
        kind,
        "primitive_type"
            | "type_identifier"
            | "qualified_identifier"
            | "template_type"
            | "sized_type_specifier"
            | "placeholder_type_specifier"
    )
}

/// Whether a C++ node kind can name a function in a function declarator.
pub fn is_cpp_function_name(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "field_identifier"
            | "qualified_identifier"
            | "template_function"
            | "destructor_name"
            | "operator_name"
    )
}

/// Whether a C++ node kind can be the target of a call expression.
pub fn is_cpp_call_target(kind: &str) -> bool {
    matches!(
        kind,
        "identifier" | "field_expression" | "qualified_identifier" | "template_function"
    )
}

/// Argument list tokens that are not arguments.
pub fn is_cpp_argument_punctuation(kind: &str) -> bool {
    matches!(kind, "(" | ")" | "," | "comment")
}

/// Node kinds the Java traversal dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaNode {
    FieldDeclaration,
    Other,
}

impl JavaNode {
    pub fn classify(kind: &str) -> Self {
        match kind {
            "field_declaration" | "constant_declaration" => JavaNode::FieldDeclaration,
            _ => JavaNode::Other,
        }
    }
}

/// Whether a Java node kind names a field type.
pub fn is_java_type(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
    )
}

/// Java modifiers recorded on fields.
pub const JAVA_FIELD_MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "volatile",
    "transient",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kinds_fall_through() {
        assert_eq!(CppNode::classify("if_statement"), CppNode::Other);
        assert_eq!(CppDeclarator::classify("array_declarator"), CppDeclarator::Other);
        assert_eq!(JavaNode::classify("method_declaration"), JavaNode::Other);
    }

    #[test]
    fn test_java_constant_is_field() {
        assert_eq!(
            JavaNode::classify("constant_declaration"),
            JavaNode::FieldDeclaration
        );
    }
}
