//! C++ structural extractor.

use std::collections::HashMap;

use tree_sitter::Node;

use super::kinds::{
    is_cpp_argument_punctuation, is_cpp_call_target, is_cpp_function_name, is_cpp_type,
    CppDeclarator, CppNode,
};
use super::types::TypeSpec;
use crate::model::{
    CallSite, ExtractedModel, MemberInitializerBinding, MethodSignature, Parameter,
    VariableDeclaration, MEMBER_VARIABLE_SENTINEL,
};
use crate::parser::ParsedSource;

/// A declarator with its pointer/reference wrappers peeled off.
struct Peeled<'t> {
    leaf: Node<'t>,
    pointer_depth: usize,
    is_reference: bool,
}

impl Peeled<'_> {
    fn leaf_is(&self, shape: CppDeclarator) -> bool {
        CppDeclarator::classify(self.leaf.kind()) == shape
    }
}

/// The declarator nested inside a wrapper declarator.
fn inner_declarator(node: Node) -> Option<Node> {
    node.child_by_field_name("declarator").or_else(|| {
        let count = node.named_child_count();
        if count == 0 {
            None
        } else {
            node.named_child(count - 1)
        }
    })
}

fn peel(node: Node) -> Peeled {
    let mut current = node;
    let mut pointer_depth = 0;
    let mut is_reference = false;

    loop {
        match CppDeclarator::classify(current.kind()) {
            CppDeclarator::Pointer | CppDeclarator::AbstractPointer => pointer_depth += 1,
            CppDeclarator::Reference | CppDeclarator::AbstractReference => is_reference = true,
            _ => break,
        }
        match inner_declarator(current) {
            Some(inner) => current = inner,
            None => break,
        }
    }

    Peeled {
        leaf: current,
        pointer_depth,
        is_reference,
    }
}

/// The `operator_cast` of a conversion operator declarator, directly or
/// under a `Widget::` qualifier.
fn operator_cast(node: Node) -> Option<Node> {
    match node.kind() {
        "operator_cast" => Some(node),
        "qualified_identifier" => operator_cast(node.child_by_field_name("name")?),
        _ => None,
    }
}

/// Walks a C++ parse tree once and builds an [`ExtractedModel`].
///
/// The enclosing method is passed down the recursion explicitly. Methods do
/// not nest: a definition found inside a body starts its own scope and the
/// outer scope resumes afterwards.
pub struct CppExtractor<'a> {
    parsed: &'a ParsedSource,
}

impl<'a> CppExtractor<'a> {
    pub fn new(parsed: &'a ParsedSource) -> Self {
        Self { parsed }
    }

    /// Extract the full model. Constructs that do not match the expected
    /// shapes are skipped.
    pub fn extract(&self) -> ExtractedModel {
        let mut model = ExtractedModel::default();
        self.visit(self.parsed.tree.root_node(), None, &mut model);
        model
    }

    fn text(&self, node: Node) -> String {
        self.parsed.node_text(node).to_string()
    }

    fn visit(&self, node: Node, method: Option<&str>, model: &mut ExtractedModel) {
        match CppNode::classify(node.kind()) {
            CppNode::FunctionDefinition => {
                match self.method_signature(node) {
                    Some(signature) => self.visit_method(node, signature, model),
                    None => tracing::trace!(
                        line = ParsedSource::line_of(node),
                        "skipping function definition with no recognizable name"
                    ),
                }
                return;
            }
            CppNode::CallExpression => {
                if let Some(method) = method {
                    if let Some(call) = self.call_site(node) {
                        model
                            .method_invocations
                            .entry(method.to_string())
                            .or_default()
                            .push(call);
                    }
                }
            }
            CppNode::Declaration => match method {
                Some(method) => {
                    let locals = self.declaration_variables(node, true);
                    model
                        .method_local_variables
                        .entry(method.to_string())
                        .or_default()
                        .extend(locals);
                }
                None => {
                    let globals = self.declaration_variables(node, false);
                    model.variables.extend(globals);
                }
            },
            CppNode::FieldDeclaration => {
                let fields = self.field_variables(node);
                model.variables.extend(fields);
            }
            CppNode::Other => {}
        }

        for child in node.children(&mut node.walk()) {
            self.visit(child, method, model);
        }
    }

    fn visit_method(&self, node: Node, signature: MethodSignature, model: &mut ExtractedModel) {
        let name = signature.name.clone();

        // Overloads share one bucket.
        model.method_invocations.entry(name.clone()).or_default();
        model.method_local_variables.entry(name.clone()).or_default();

        let bindings = self.member_initializers(node, &signature.parameters);
        model.member_initializer_variables.extend(bindings);
        model.methods.push(signature);

        for child in node.children(&mut node.walk()) {
            if child.kind() == "compound_statement" {
                self.visit(child, Some(&name), model);
            }
        }
    }

    /// Declared type of a declaration-like node: its `type` child plus any
    /// qualifier tokens.
    fn declared_type(&self, node: Node) -> Option<TypeSpec> {
        let type_node = node
            .child_by_field_name("type")
            .filter(|n| is_cpp_type(n.kind()))?;
        let qualifiers = node
            .children(&mut node.walk())
            .filter(|c| c.kind() == "type_qualifier")
            .map(|c| self.text(c))
            .collect();
        Some(TypeSpec::new(self.text(type_node)).with_qualifiers(qualifiers))
    }

    fn method_signature(&self, node: Node) -> Option<MethodSignature> {
        let outer = node.child_by_field_name("declarator")?;
        if let Some(cast) = operator_cast(outer) {
            return self.conversion_signature(node, outer, cast);
        }

        let declarator = peel(outer);
        if !declarator.leaf_is(CppDeclarator::Function) {
            return None;
        }
        let function = declarator.leaf;

        let mut name = None;
        let mut parameters = Vec::new();
        for child in function.children(&mut function.walk()) {
            if is_cpp_function_name(child.kind()) {
                name = Some(self.text(child));
            } else if child.kind() == "parameter_list" {
                parameters = self.parameters(child);
            }
        }
        let name = name.filter(|n| !n.is_empty())?;

        let return_type = match self.declared_type(node) {
            Some(ty) => ty
                .wrapped(declarator.pointer_depth, declarator.is_reference)
                .to_string(),
            None => "void".to_string(),
        };

        Some(MethodSignature {
            name,
            return_type,
            parameters,
            line_start: ParsedSource::line_of(node),
            line_end: ParsedSource::end_line_of(node),
        })
    }

    /// Signature of a conversion operator such as `Widget::operator bool()`.
    /// The name runs up to the parameter list and the return type is the
    /// conversion target.
    fn conversion_signature(
        &self,
        node: Node,
        outer: Node,
        cast: Node,
    ) -> Option<MethodSignature> {
        let list = cast
            .child_by_field_name("declarator")
            .and_then(|d| d.child_by_field_name("parameters"))?;
        let name = self
            .parsed
            .source_str()
            .get(outer.start_byte()..list.start_byte())?
            .trim()
            .to_string();
        if name.is_empty() {
            return None;
        }

        let return_type = self
            .declared_type(cast)
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| "void".to_string());

        Some(MethodSignature {
            name,
            return_type,
            parameters: self.parameters(list),
            line_start: ParsedSource::line_of(node),
            line_end: ParsedSource::end_line_of(node),
        })
    }

    fn parameters(&self, list: Node) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        for child in list.children(&mut list.walk()) {
            if !matches!(
                child.kind(),
                "parameter_declaration" | "optional_parameter_declaration"
            ) {
                continue;
            }
            let Some(base) = self.declared_type(child) else {
                continue;
            };

            let (name, param_type) = match child.child_by_field_name("declarator") {
                Some(decl) => {
                    let peeled = peel(decl);
                    let name = if peeled.leaf_is(CppDeclarator::Identifier) {
                        self.text(peeled.leaf)
                    } else {
                        String::new()
                    };
                    (name, base.wrapped(peeled.pointer_depth, peeled.is_reference))
                }
                None => (String::new(), base),
            };

            parameters.push(Parameter {
                param_type: param_type.to_string(),
                name,
            });
        }

        parameters
    }

    /// Bindings from a constructor's `: member(expr)` list.
    ///
    /// A parameter `_x` types both a member `_x` and a member `m_x`. When the
    /// member name itself is unknown, the parameter named by a bare `(p)`
    /// initializer is tried.
    fn member_initializers(
        &self,
        node: Node,
        parameters: &[Parameter],
    ) -> Vec<MemberInitializerBinding> {
        let mut param_types: HashMap<String, String> = HashMap::new();
        for param in parameters {
            if param.name.starts_with('_') {
                param_types.insert(format!("m{}", param.name), param.param_type.clone());
            }
            param_types.insert(param.name.clone(), param.param_type.clone());
        }

        let mut bindings = Vec::new();
        for list in node
            .children(&mut node.walk())
            .filter(|c| c.kind() == "field_initializer_list")
        {
            for init in list
                .children(&mut list.walk())
                .filter(|c| c.kind() == "field_initializer")
            {
                let mut name = None;
                let mut initialization = None;
                for child in init.children(&mut init.walk()) {
                    match child.kind() {
                        "field_identifier" => name = Some(self.text(child)),
                        "argument_list" | "initializer_list" => {
                            initialization = Some(self.text(child))
                        }
                        _ => {}
                    }
                }
                let Some(name) = name else {
                    continue;
                };

                let var_type = param_types
                    .get(&name)
                    .or_else(|| {
                        let arg = initialization
                            .as_deref()?
                            .trim_matches(|c| matches!(c, '(' | ')' | '{' | '}'))
                            .trim();
                        param_types.get(arg)
                    })
                    .cloned()
                    .unwrap_or_else(|| MEMBER_VARIABLE_SENTINEL.to_string());

                bindings.push(MemberInitializerBinding {
                    name,
                    var_type,
                    initialization: initialization.unwrap_or_default(),
                    line: ParsedSource::line_of(init),
                });
            }
        }

        bindings
    }

    fn call_site(&self, node: Node) -> Option<CallSite> {
        let mut target = None;
        let mut arguments = Vec::new();

        for child in node.children(&mut node.walk()) {
            if is_cpp_call_target(child.kind()) {
                target = Some(self.text(child));
            } else if child.kind() == "argument_list" {
                arguments = child
                    .children(&mut child.walk())
                    .filter(|a| !is_cpp_argument_punctuation(a.kind()))
                    .map(|a| self.text(a))
                    .collect();
            }
        }

        Some(CallSite {
            method_name: target?,
            arguments,
            line: ParsedSource::line_of(node),
        })
    }

    /// One variable per declarator of a `declaration` node.
    fn declaration_variables(&self, node: Node, local: bool) -> Vec<VariableDeclaration> {
        let Some(base) = self.declared_type(node) else {
            return Vec::new();
        };
        let line = ParsedSource::line_of(node);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();
        declarators
            .into_iter()
            .filter_map(|decl| self.declared_variable(decl, &base, line, local))
            .collect()
    }

    fn declared_variable(
        &self,
        decl: Node,
        base: &TypeSpec,
        line: usize,
        local: bool,
    ) -> Option<VariableDeclaration> {
        match CppDeclarator::classify(decl.kind()) {
            CppDeclarator::Init => {
                let peeled = peel(decl.child_by_field_name("declarator")?);
                if !peeled.leaf_is(CppDeclarator::Identifier) {
                    return None;
                }
                Some(VariableDeclaration {
                    name: self.text(peeled.leaf),
                    var_type: base
                        .wrapped(peeled.pointer_depth, peeled.is_reference)
                        .to_string(),
                    line,
                    initialization: self.initializer(decl),
                })
            }
            // `Processor p(m_th, m_context);` parses as a function declarator
            // when the arguments could be type names.
            CppDeclarator::Function if local => {
                let mut name = None;
                let mut initialization = None;
                for child in decl.children(&mut decl.walk()) {
                    match child.kind() {
                        "identifier" => name = Some(self.text(child)),
                        "parameter_list" => initialization = Some(self.text(child)),
                        _ => {}
                    }
                }
                Some(VariableDeclaration {
                    name: name?,
                    var_type: base.to_string(),
                    line,
                    initialization,
                })
            }
            CppDeclarator::Function => None,
            _ => {
                let peeled = peel(decl);
                if !peeled.leaf_is(CppDeclarator::Identifier) {
                    return None;
                }
                Some(VariableDeclaration {
                    name: self.text(peeled.leaf),
                    var_type: base
                        .wrapped(peeled.pointer_depth, peeled.is_reference)
                        .to_string(),
                    line,
                    initialization: None,
                })
            }
        }
    }

    /// Initializer text of an `init_declarator`: the expression after `=`,
    /// else a call, argument list or brace list child.
    fn initializer(&self, decl: Node) -> Option<String> {
        let mut fallback = None;
        for child in decl.children(&mut decl.walk()) {
            match child.kind() {
                "=" => return child.next_named_sibling().map(|v| self.text(v)),
                "call_expression" | "argument_list" | "initializer_list" => {
                    fallback.get_or_insert_with(|| self.text(child));
                }
                _ => {}
            }
        }
        fallback
    }

    fn field_variables(&self, node: Node) -> Vec<VariableDeclaration> {
        let Some(base) = self.declared_type(node) else {
            return Vec::new();
        };
        let line = ParsedSource::line_of(node);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();
        declarators
            .into_iter()
            .filter_map(|decl| {
                let peeled = peel(decl);
                if !peeled.leaf_is(CppDeclarator::FieldIdentifier) {
                    return None;
                }
                Some(VariableDeclaration {
                    name: self.text(peeled.leaf),
                    var_type: base
                        .wrapped(peeled.pointer_depth, peeled.is_reference)
                        .to_string(),
                    line,
                    initialization: None,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{for_id, ParseContext};

    fn extract(source: &str) -> ExtractedModel {
        let mut ctx = ParseContext::new();
        let parsed = ctx
            .parse(for_id("cpp").unwrap(), "<test>", source.as_bytes())
            .unwrap();
        CppExtractor::new(&parsed).extract()
    }

    fn var<'m>(vars: &'m [VariableDeclaration], name: &str) -> &'m VariableDeclaration {
        vars.iter()
            .find(|v| v.name == name)
            .unwrap_or_else(|| panic!("expected variable {}, got: {:?}", name, vars))
    }

    #[test]
    fn test_struct_fields() {
        let model = extract(
            r#"
struct Report {
    int report_version;
    const PimpXClick* xclick;
    std::string name;
    Session& session;
    char** argv;
};
"#,
        );

        assert_eq!(var(&model.variables, "report_version").var_type, "int");
        assert_eq!(var(&model.variables, "xclick").var_type, "const PimpXClick*");
        assert_eq!(var(&model.variables, "name").var_type, "std::string");
        assert_eq!(var(&model.variables, "session").var_type, "Session&");
        assert_eq!(var(&model.variables, "argv").var_type, "char**");
        assert_eq!(var(&model.variables, "report_version").line, 3);
    }

    #[test]
    fn test_member_function_prototypes_are_not_fields() {
        let model = extract(
            r#"
class Widget {
public:
    void process();
    Widget* clone() const;
    int count;
};
"#,
        );

        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.variables[0].name, "count");
    }

    #[test]
    fn test_multiple_field_declarators() {
        let model = extract("struct P { int x, *y; };");
        assert_eq!(var(&model.variables, "x").var_type, "int");
        assert_eq!(var(&model.variables, "y").var_type, "int*");
    }

    #[test]
    fn test_globals() {
        let model = extract(
            r#"
int counter = 0;
Config* g_config;
void prototype(int value);
"#,
        );

        assert_eq!(model.variables.len(), 2);
        assert_eq!(var(&model.variables, "counter").var_type, "int");
        assert_eq!(var(&model.variables, "g_config").var_type, "Config*");
        assert!(model.methods.is_empty());
    }

    #[test]
    fn test_method_signature() {
        let model = extract(
            r#"
int Engine::start(const Options& opts, Context* ctx, int retries) {
    return 0;
}
"#,
        );

        assert_eq!(model.methods.len(), 1);
        let method = &model.methods[0];
        assert_eq!(method.name, "Engine::start");
        assert_eq!(method.return_type, "int");
        assert_eq!(method.line_start, 2);
        assert_eq!(method.line_end, 4);
        assert_eq!(method.parameters.len(), 3);
        assert_eq!(method.parameters[0].param_type, "const Options&");
        assert_eq!(method.parameters[0].name, "opts");
        assert_eq!(method.parameters[1].param_type, "Context*");
        assert_eq!(method.parameters[1].name, "ctx");
        assert_eq!(method.parameters[2].param_type, "int");
    }

    #[test]
    fn test_constructor_defaults_to_void() {
        let model = extract("Widget::Widget() {}");
        assert_eq!(model.methods[0].name, "Widget::Widget");
        assert_eq!(model.methods[0].return_type, "void");
    }

    #[test]
    fn test_pointer_return_type() {
        let model = extract("Node* Tree::root() { return nullptr; }");
        assert_eq!(model.methods[0].name, "Tree::root");
        assert_eq!(model.methods[0].return_type, "Node*");
    }

    #[test]
    fn test_template_specialization_and_conversion_operator() {
        let model = extract(
            "template <> void fill<int>(int v) { int local = v; }\n\
             Widget::operator bool() const { bool ok = true; return ok; }",
        );

        assert!(model.variables.is_empty(), "locals leaked: {:?}", model.variables);
        let names: Vec<&str> = model.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["fill<int>", "Widget::operator bool"]);

        assert_eq!(model.methods[0].parameters[0].name, "v");
        assert_eq!(model.method_local_variables["fill<int>"][0].name, "local");

        let cast = &model.methods[1];
        assert_eq!(cast.return_type, "bool");
        assert!(cast.parameters.is_empty());
        assert_eq!(cast.line_start, 2);
        assert_eq!(
            model.method_local_variables["Widget::operator bool"][0].name,
            "ok"
        );
    }

    #[test]
    fn test_inline_conversion_operator() {
        let model = extract("class Flag { operator int() const { int v = 1; return v; } };");
        assert!(model.variables.is_empty());
        assert_eq!(model.methods[0].name, "operator int");
        assert_eq!(model.method_local_variables["operator int"][0].name, "v");
    }

    #[test]
    fn test_unnamed_parameter() {
        let model = extract("void f(int, char*) {}");
        let params = &model.methods[0].parameters;
        assert_eq!(params[0].param_type, "int");
        assert_eq!(params[0].name, "");
        assert_eq!(params[1].param_type, "char*");
        assert_eq!(params[1].name, "");
    }

    #[test]
    fn test_member_initializer_binding() {
        let model = extract("Widget::Widget(Context* _ctx) : m_ctx(_ctx) {}");

        assert_eq!(model.member_initializer_variables.len(), 1);
        let binding = &model.member_initializer_variables[0];
        assert_eq!(binding.name, "m_ctx");
        assert_eq!(binding.var_type, "Context*");
        assert_eq!(binding.initialization, "(_ctx)");
        assert_eq!(binding.line, 1);
    }

    #[test]
    fn test_member_initializer_type_inference() {
        let model = extract(
            r#"
Handler::Handler(Thread* _th, Context& ctx, int limit)
    : _th(_th), m_context(ctx), m_limit(limit), m_count(0) {}
"#,
        );

        let bindings = &model.member_initializer_variables;
        assert_eq!(bindings.len(), 4);
        assert_eq!(bindings[0].name, "_th");
        assert_eq!(bindings[0].var_type, "Thread*");
        // resolved through the initializer argument
        assert_eq!(bindings[1].var_type, "Context&");
        assert_eq!(bindings[2].var_type, "int");
        assert_eq!(bindings[3].var_type, MEMBER_VARIABLE_SENTINEL);
        assert_eq!(bindings[3].initialization, "(0)");
        assert_eq!(bindings[0].line, 3);
    }

    #[test]
    fn test_call_sites() {
        let model = extract(
            r#"
void Runner::go(Session* session) {
    helper(1, "two");
    session->open();
    cache.get(key).value();
    std::sort(a, b);
}
"#,
        );

        let calls = &model.method_invocations["Runner::go"];
        let names: Vec<&str> = calls.iter().map(|c| c.method_name.as_str()).collect();
        assert!(names.contains(&"helper"));
        assert!(names.contains(&"session->open"));
        assert!(names.contains(&"cache.get"));
        assert!(names.contains(&"std::sort"));

        let helper = calls.iter().find(|c| c.method_name == "helper").unwrap();
        assert_eq!(helper.arguments, vec!["1", "\"two\""]);
        assert_eq!(helper.line, 3);
    }

    #[test]
    fn test_local_variables() {
        let model = extract(
            r#"
void Service::handle(int id) {
    int count = 5;
    Request* req = new Request(id);
    const Info& info = lookup(id);
    auto total = compute(count);
    Buffer buf(64, id);
    std::string label;
}
"#,
        );

        let locals = &model.method_local_variables["Service::handle"];
        let count = var(locals, "count");
        assert_eq!(count.var_type, "int");
        assert_eq!(count.line, 3);
        assert_eq!(count.initialization.as_deref(), Some("5"));

        let req = var(locals, "req");
        assert_eq!(req.var_type, "Request*");
        assert_eq!(req.initialization.as_deref(), Some("new Request(id)"));

        let info = var(locals, "info");
        assert_eq!(info.var_type, "const Info&");
        assert_eq!(info.initialization.as_deref(), Some("lookup(id)"));

        assert_eq!(var(locals, "total").var_type, "auto");

        let buf = var(locals, "buf");
        assert_eq!(buf.var_type, "Buffer");
        assert_eq!(buf.initialization.as_deref(), Some("(64, id)"));

        let label = var(locals, "label");
        assert_eq!(label.var_type, "std::string");
        assert!(label.initialization.is_none());

        assert!(model.variables.is_empty(), "locals must not leak into globals");
    }

    #[test]
    fn test_locals_do_not_cross_methods() {
        let model = extract(
            r#"
void a() { int x = 1; }
void b() { int y = 2; }
"#,
        );

        assert_eq!(model.method_local_variables["a"].len(), 1);
        assert_eq!(model.method_local_variables["a"][0].name, "x");
        assert_eq!(model.method_local_variables["b"][0].name, "y");
    }

    #[test]
    fn test_inline_methods_in_class() {
        let model = extract(
            r#"
class Counter {
public:
    void bump() { int step = 1; total.add(step); }
private:
    Total total;
};
"#,
        );

        assert_eq!(model.methods.len(), 1);
        assert_eq!(model.methods[0].name, "bump");
        assert_eq!(model.method_local_variables["bump"][0].name, "step");
        assert_eq!(model.method_invocations["bump"][0].method_name, "total.add");
        assert_eq!(var(&model.variables, "total").var_type, "Total");
        assert!(model.variables.iter().all(|v| v.name != "step"));
    }

    #[test]
    fn test_no_methods_means_empty_buckets() {
        let model = extract("int a; struct S { int b; };");
        assert!(model.methods.is_empty());
        assert!(model.method_invocations.is_empty());
        assert!(model.method_local_variables.is_empty());
    }

    #[test]
    fn test_empty_method_gets_buckets() {
        let model = extract("void idle() {}");
        assert!(model.method_invocations["idle"].is_empty());
        assert!(model.method_local_variables["idle"].is_empty());
    }

    #[test]
    fn test_overloads_share_bucket() {
        let model = extract(
            r#"
void emit(int a) { log(a); }
void emit(double b) { trace(b); }
"#,
        );

        assert_eq!(model.methods.len(), 2);
        assert_eq!(model.method_invocations["emit"].len(), 2);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let source = r#"
class A { int x; };
void A::f(int y) { int z = y; g(z); }
"#;
        assert_eq!(extract(source), extract(source));
    }

    #[test]
    fn test_malformed_source_does_not_panic() {
        let model = extract("class { int ;; void f( { x.y(");
        assert!(model.member_initializer_variables.is_empty());
    }
}
