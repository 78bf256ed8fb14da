//! Receiver type resolution.
//!
//! For a call such as `obj.run()` or `ptr->run()` the receiver (`obj`,
//! `ptr`) is looked up in four scopes, in order, and the first hit wins:
//!
//! 1. locals of the enclosing method declared before the call line
//! 2. parameters of the enclosing method
//! 3. constructor member-initializer bindings anywhere in the file
//! 4. globals and fields of the file

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{CallSite, ExtractedModel};

/// Which scope produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    LocalVariables,
    MethodParameters,
    MemberInitializerVariables,
    GlobalVariables,
}

impl LookupStrategy {
    pub const ALL: [LookupStrategy; 4] = [
        LookupStrategy::LocalVariables,
        LookupStrategy::MethodParameters,
        LookupStrategy::MemberInitializerVariables,
        LookupStrategy::GlobalVariables,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStrategy::LocalVariables => "local_variables",
            LookupStrategy::MethodParameters => "method_parameters",
            LookupStrategy::MemberInitializerVariables => "member_initializer_variables",
            LookupStrategy::GlobalVariables => "global_variables",
        }
    }

    /// Human readable scope name.
    pub fn label(&self) -> &'static str {
        match self {
            LookupStrategy::LocalVariables => "Local Variable",
            LookupStrategy::MethodParameters => "Method Parameter",
            LookupStrategy::MemberInitializerVariables => "Member Initializer",
            LookupStrategy::GlobalVariables => "Global Variable",
        }
    }
}

/// A receiver found in one of the lookup scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub variable_name: String,
    pub resolved_type: String,
    pub declaration_line: usize,
    pub strategy: LookupStrategy,
}

/// Resolution outcome for one call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCall {
    /// Enclosing method.
    pub method_name: String,
    /// Call target text, e.g. `obj.run`.
    pub method_call: String,
    pub line: usize,
    pub variable_name: String,
    pub resolved_type: Option<String>,
    pub declaration_line: Option<usize>,
    pub lookup_strategy: Option<LookupStrategy>,
    pub declaration_found: bool,
}

/// Resolutions for every method of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeResolutionReport {
    pub file_name: String,
    /// Method name to its resolvable call sites. Methods without any
    /// single-dot/arrow call are absent.
    pub type_resolutions: BTreeMap<String, Vec<ResolvedCall>>,
}

/// Totals over a [`TypeResolutionReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub total_calls: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Percentage of resolved calls, 0 when there are no calls.
    pub resolution_rate: f64,
    pub by_strategy: BTreeMap<LookupStrategy, usize>,
}

/// Receiver of a single-dot or single-arrow call target.
///
/// `obj.run` and `ptr->run` have receivers; `run`, `a.b.c`, `a->b->c` and
/// `a.b->c` do not.
pub fn receiver_of(call_text: &str) -> Option<&str> {
    let dots = call_text.matches('.').count();
    let arrows = call_text.matches("->").count();

    match (dots, arrows) {
        (1, 0) => call_text.split_once('.').map(|(receiver, _)| receiver),
        (0, 1) => call_text.split_once("->").map(|(receiver, _)| receiver),
        _ => None,
    }
}

fn find_in_locals(
    model: &ExtractedModel,
    method: &str,
    variable: &str,
    line: usize,
) -> Option<Resolution> {
    model
        .locals_of(method)
        .iter()
        .filter(|v| v.name == variable && v.line < line)
        .max_by_key(|v| v.line)
        .map(|v| Resolution {
            variable_name: variable.to_string(),
            resolved_type: v.var_type.clone(),
            declaration_line: v.line,
            strategy: LookupStrategy::LocalVariables,
        })
}

fn find_in_parameters(model: &ExtractedModel, method: &str, variable: &str) -> Option<Resolution> {
    model.methods_named(method).find_map(|m| {
        m.parameter(variable).map(|p| Resolution {
            variable_name: variable.to_string(),
            resolved_type: p.param_type.clone(),
            declaration_line: m.line_start,
            strategy: LookupStrategy::MethodParameters,
        })
    })
}

fn find_in_member_initializers(model: &ExtractedModel, variable: &str) -> Option<Resolution> {
    model
        .member_initializer_variables
        .iter()
        .find(|b| b.name == variable)
        .map(|b| Resolution {
            variable_name: variable.to_string(),
            resolved_type: b.var_type.clone(),
            declaration_line: b.line,
            strategy: LookupStrategy::MemberInitializerVariables,
        })
}

fn find_in_globals(model: &ExtractedModel, variable: &str) -> Option<Resolution> {
    model
        .variables
        .iter()
        .find(|v| v.name == variable)
        .map(|v| Resolution {
            variable_name: variable.to_string(),
            resolved_type: if v.var_type.is_empty() {
                "unknown".to_string()
            } else {
                v.var_type.clone()
            },
            declaration_line: v.line,
            strategy: LookupStrategy::GlobalVariables,
        })
}

/// Resolve `variable` as seen from `line` inside `method`.
pub fn resolve_variable(
    model: &ExtractedModel,
    method: &str,
    variable: &str,
    line: usize,
) -> Option<Resolution> {
    find_in_locals(model, method, variable, line)
        .or_else(|| find_in_parameters(model, method, variable))
        .or_else(|| find_in_member_initializers(model, variable))
        .or_else(|| find_in_globals(model, variable))
}

/// Resolve the receiver type of `call_text` at `line` inside `method`.
///
/// Returns `None` when the call has no receiver or no scope declares it.
pub fn resolve_call_site_type(
    model: &ExtractedModel,
    method: &str,
    call_text: &str,
    line: usize,
) -> Option<Resolution> {
    let receiver = receiver_of(call_text)?;
    resolve_variable(model, method, receiver, line)
}

fn resolve_call(model: &ExtractedModel, method: &str, call: &CallSite) -> Option<ResolvedCall> {
    let Some(receiver) = receiver_of(&call.method_name) else {
        tracing::trace!(call = %call.method_name, "call has no single receiver");
        return None;
    };
    let resolution = resolve_variable(model, method, receiver, call.line);

    Some(ResolvedCall {
        method_name: method.to_string(),
        method_call: call.method_name.clone(),
        line: call.line,
        variable_name: receiver.to_string(),
        declaration_found: resolution.is_some(),
        declaration_line: resolution.as_ref().map(|r| r.declaration_line),
        lookup_strategy: resolution.as_ref().map(|r| r.strategy),
        resolved_type: resolution.map(|r| r.resolved_type),
    })
}

/// Resolve every call site of every method in `model`.
pub fn resolve_all(model: &ExtractedModel, file_name: &str) -> TypeResolutionReport {
    let type_resolutions = model
        .method_invocations
        .iter()
        .filter_map(|(method, calls)| {
            let resolved: Vec<ResolvedCall> = calls
                .iter()
                .filter_map(|call| resolve_call(model, method, call))
                .collect();
            (!resolved.is_empty()).then(|| (method.clone(), resolved))
        })
        .collect();

    TypeResolutionReport {
        file_name: file_name.to_string(),
        type_resolutions,
    }
}

impl TypeResolutionReport {
    pub fn calls(&self) -> impl Iterator<Item = &ResolvedCall> {
        self.type_resolutions.values().flatten()
    }

    pub fn summary(&self) -> ResolutionSummary {
        let mut total_calls = 0;
        let mut by_strategy = BTreeMap::new();
        for call in self.calls() {
            total_calls += 1;
            if let Some(strategy) = call.lookup_strategy {
                *by_strategy.entry(strategy).or_insert(0) += 1;
            }
        }
        let resolved: usize = by_strategy.values().sum();

        ResolutionSummary {
            total_calls,
            resolved,
            unresolved: total_calls - resolved,
            resolution_rate: if total_calls == 0 {
                0.0
            } else {
                resolved as f64 / total_calls as f64 * 100.0
            },
            by_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        MemberInitializerBinding, MethodSignature, Parameter, VariableDeclaration,
    };

    fn var(name: &str, ty: &str, line: usize) -> VariableDeclaration {
        VariableDeclaration {
            name: name.to_string(),
            var_type: ty.to_string(),
            line,
            initialization: None,
        }
    }

    fn call(target: &str, line: usize) -> CallSite {
        CallSite {
            method_name: target.to_string(),
            arguments: vec![],
            line,
        }
    }

    fn method(name: &str, params: &[(&str, &str)], line_start: usize) -> MethodSignature {
        MethodSignature {
            name: name.to_string(),
            return_type: "void".to_string(),
            parameters: params
                .iter()
                .map(|(ty, n)| Parameter {
                    param_type: ty.to_string(),
                    name: n.to_string(),
                })
                .collect(),
            line_start,
            line_end: line_start + 10,
        }
    }

    #[test]
    fn test_receiver_shapes() {
        assert_eq!(receiver_of("obj.run"), Some("obj"));
        assert_eq!(receiver_of("ptr->run"), Some("ptr"));
        assert_eq!(receiver_of("run"), None);
        assert_eq!(receiver_of("a.b.c"), None);
        assert_eq!(receiver_of("a->b->c"), None);
        assert_eq!(receiver_of("a.b->c"), None);
        assert_eq!(receiver_of("ns::run"), None);
    }

    #[test]
    fn test_parameter_tier() {
        let mut model = ExtractedModel::default();
        model.methods.push(method("foo", &[("Session", "obj")], 40));

        let r = resolve_call_site_type(&model, "foo", "obj.run", 42).unwrap();
        assert_eq!(r.strategy, LookupStrategy::MethodParameters);
        assert_eq!(r.resolved_type, "Session");
        assert_eq!(r.declaration_line, 40);
    }

    #[test]
    fn test_local_beats_global() {
        let mut model = ExtractedModel::default();
        model.variables.push(var("cfg", "GlobalConfig", 1));
        model
            .method_local_variables
            .insert("foo".to_string(), vec![var("cfg", "LocalConfig", 5)]);

        let r = resolve_call_site_type(&model, "foo", "cfg.load", 9).unwrap();
        assert_eq!(r.strategy, LookupStrategy::LocalVariables);
        assert_eq!(r.resolved_type, "LocalConfig");
    }

    #[test]
    fn test_nearest_preceding_local() {
        let mut model = ExtractedModel::default();
        model.method_local_variables.insert(
            "foo".to_string(),
            vec![var("x", "A", 10), var("x", "B", 20), var("x", "C", 35)],
        );

        let r = resolve_call_site_type(&model, "foo", "x.go", 30).unwrap();
        assert_eq!(r.declaration_line, 20);
        assert_eq!(r.resolved_type, "B");
    }

    #[test]
    fn test_local_after_call_is_ignored() {
        let mut model = ExtractedModel::default();
        model
            .method_local_variables
            .insert("foo".to_string(), vec![var("x", "Late", 12)]);
        model.methods.push(method("foo", &[("Param", "x")], 1));

        let r = resolve_call_site_type(&model, "foo", "x->go", 12).unwrap();
        assert_eq!(r.strategy, LookupStrategy::MethodParameters);
    }

    #[test]
    fn test_member_initializer_tier() {
        let mut model = ExtractedModel::default();
        model.member_initializer_variables.push(MemberInitializerBinding {
            name: "m_ctx".to_string(),
            var_type: "Context*".to_string(),
            initialization: "(_ctx)".to_string(),
            line: 3,
        });
        model.variables.push(var("m_ctx", "Other", 1));

        let r = resolve_call_site_type(&model, "run", "m_ctx->open", 20).unwrap();
        assert_eq!(r.strategy, LookupStrategy::MemberInitializerVariables);
        assert_eq!(r.resolved_type, "Context*");
    }

    #[test]
    fn test_global_empty_type_is_unknown() {
        let mut model = ExtractedModel::default();
        model.variables.push(var("g", "", 2));

        let r = resolve_call_site_type(&model, "run", "g.tick", 20).unwrap();
        assert_eq!(r.strategy, LookupStrategy::GlobalVariables);
        assert_eq!(r.resolved_type, "unknown");
    }

    #[test]
    fn test_resolve_all() {
        let mut model = ExtractedModel::default();
        model.methods.push(method("foo", &[("Session", "obj")], 40));
        model.method_invocations.insert(
            "foo".to_string(),
            vec![
                call("obj.run", 42),
                call("helper", 43),
                call("a.b.c", 44),
                call("ghost->x", 45),
            ],
        );
        model
            .method_invocations
            .insert("bar".to_string(), vec![call("free_fn", 50)]);

        let report = resolve_all(&model, "session.cpp");
        assert_eq!(report.file_name, "session.cpp");
        assert!(!report.type_resolutions.contains_key("bar"));

        let calls = &report.type_resolutions["foo"];
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].resolved_type.as_deref(), Some("Session"));
        assert_eq!(calls[0].lookup_strategy, Some(LookupStrategy::MethodParameters));
        assert!(!calls[1].declaration_found);
        assert_eq!(calls[1].variable_name, "ghost");
        assert!(calls[1].resolved_type.is_none());

        let summary = report.summary();
        assert_eq!(summary.total_calls, 2);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.resolution_rate, 50.0);
        assert_eq!(summary.by_strategy[&LookupStrategy::MethodParameters], 1);
    }

    #[test]
    fn test_report_json_nulls() {
        let mut model = ExtractedModel::default();
        model
            .method_invocations
            .insert("foo".to_string(), vec![call("ghost.x", 3)]);

        let json = serde_json::to_value(resolve_all(&model, "a.cpp")).unwrap();
        let entry = &json["type_resolutions"]["foo"][0];
        assert!(entry["resolved_type"].is_null());
        assert!(entry["lookup_strategy"].is_null());
        assert_eq!(entry["declaration_found"], false);
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&LookupStrategy::MemberInitializerVariables).unwrap();
        assert_eq!(json, "\"member_initializer_variables\"");
        for s in LookupStrategy::ALL {
            assert_eq!(serde_json::to_string(&s).unwrap(), format!("\"{}\"", s.as_str()));
        }
    }
}
