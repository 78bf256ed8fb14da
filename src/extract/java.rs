//! Java field extractor.

use tree_sitter::Node;

use super::kinds::{is_java_type, JavaNode, JAVA_FIELD_MODIFIERS};
use crate::model::FieldRecord;
use crate::parser::ParsedSource;

/// Collects field and interface-constant declarations from a Java tree.
pub struct JavaExtractor<'a> {
    parsed: &'a ParsedSource,
}

impl<'a> JavaExtractor<'a> {
    pub fn new(parsed: &'a ParsedSource) -> Self {
        Self { parsed }
    }

    /// One record per declared variable, in source order.
    pub fn extract_fields(&self) -> Vec<FieldRecord> {
        let mut fields = Vec::new();
        self.visit(self.parsed.tree.root_node(), &mut fields);
        fields
    }

    fn text(&self, node: Node) -> String {
        self.parsed.node_text(node).to_string()
    }

    fn visit(&self, node: Node, fields: &mut Vec<FieldRecord>) {
        if JavaNode::classify(node.kind()) == JavaNode::FieldDeclaration {
            fields.extend(self.field_records(node));
        }

        for child in node.children(&mut node.walk()) {
            self.visit(child, fields);
        }
    }

    fn field_records(&self, node: Node) -> Vec<FieldRecord> {
        let mut field_type = None;
        let mut modifiers = Vec::new();
        let mut names = Vec::new();

        for child in node.children(&mut node.walk()) {
            match child.kind() {
                "modifiers" => {
                    for modifier in child.children(&mut child.walk()) {
                        if JAVA_FIELD_MODIFIERS.contains(&modifier.kind()) {
                            modifiers.push(self.text(modifier));
                        }
                    }
                }
                "variable_declarator" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        names.push(self.text(name));
                    }
                }
                kind if is_java_type(kind) => field_type = Some(self.text(child)),
                _ => {}
            }
        }

        let Some(field_type) = field_type else {
            return Vec::new();
        };
        let modifiers = (!modifiers.is_empty()).then_some(modifiers);

        names
            .into_iter()
            .map(|name| FieldRecord {
                name,
                field_type: field_type.clone(),
                modifiers: modifiers.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{for_id, ParseContext};

    fn fields(source: &str) -> Vec<FieldRecord> {
        let mut ctx = ParseContext::new();
        let parsed = ctx
            .parse(for_id("java").unwrap(), "<test>", source.as_bytes())
            .unwrap();
        JavaExtractor::new(&parsed).extract_fields()
    }

    #[test]
    fn test_fields_with_modifiers() {
        let fields = fields(
            r#"
public class Report {
    private Integer _ReportVersion;
    public static final String CODEGEN_VERSION = "1";
    protected List<String> names;
    int[] counts;
    boolean active;
    double ratio;
    java.util.Date created;

    public void run() { int local = 1; }
}
"#,
        );

        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "_ReportVersion",
                "CODEGEN_VERSION",
                "names",
                "counts",
                "active",
                "ratio",
                "created"
            ]
        );

        assert_eq!(fields[0].field_type, "Integer");
        assert_eq!(fields[0].modifiers, Some(vec!["private".to_string()]));
        assert_eq!(
            fields[1].modifiers,
            Some(vec![
                "public".to_string(),
                "static".to_string(),
                "final".to_string()
            ])
        );
        assert_eq!(fields[2].field_type, "List<String>");
        assert_eq!(fields[3].field_type, "int[]");
        assert!(fields[3].modifiers.is_none());
        assert_eq!(fields[6].field_type, "java.util.Date");
    }

    #[test]
    fn test_multiple_declarators() {
        let fields = fields("class P { private int x, y = 2; }");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "y");
        assert_eq!(fields[1].field_type, "int");
    }

    #[test]
    fn test_interface_constants() {
        let fields = fields("interface Limits { int MAX = 10; }");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "MAX");
    }

    #[test]
    fn test_nested_class_fields() {
        let fields = fields("class Outer { int a; static class Inner { long b; } }");
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
