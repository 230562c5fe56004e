//! Best-effort local bindings for one function body.
//!
//! Only syntax is consulted: parameter declarations, `var` specs, `:=` and `=`
//! assignments. Anything needing real type checking stays `unknown`.

use super::options::{
    is_activity_options_literal, is_retry_policy_literal, parse_activity_options,
    parse_retry_policy, resolve_options_expr,
};
use super::parser::{
    call_arguments, named_children, node_text, selector_member, string_literal_value,
    unwrap_expression, visit_descendants,
};
use crate::core::{ActivityOptions, Parameter, RetryPolicy, UNKNOWN_TYPE};
use std::collections::HashMap;
use tree_sitter::Node;

pub const WITH_ACTIVITY_OPTIONS: &[&str] = &["WithActivityOptions", "WithLocalActivityOptions"];
pub const GET_SIGNAL_CHANNEL: &str = "GetSignalChannel";

#[derive(Debug, Default, Clone)]
pub struct LocalScope {
    types: HashMap<String, String>,
    option_literals: HashMap<String, ActivityOptions>,
    retry_policies: HashMap<String, RetryPolicy>,
    /// Per context variable, every options binding with the byte offset where it takes effect.
    context_options: HashMap<String, Vec<(usize, ActivityOptions)>>,
    signal_channels: HashMap<String, String>,
}

impl LocalScope {
    pub fn build(parameters: &[Parameter], body: Option<Node>, source: &str) -> Self {
        let mut scope = Self::default();
        for param in parameters {
            scope.types.insert(param.name.clone(), param.type_text.clone());
        }
        if let Some(body) = body {
            visit_descendants(body, &mut |node| match node.kind() {
                "short_var_declaration" | "assignment_statement" => {
                    scope.bind_assignment(&node, source)
                }
                "var_spec" => scope.bind_var_spec(&node, source),
                _ => {}
            });
        }
        scope
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }

    pub fn options_literal(&self, name: &str) -> Option<&ActivityOptions> {
        self.option_literals.get(name)
    }

    pub fn retry_policy(&self, name: &str) -> Option<&RetryPolicy> {
        self.retry_policies.get(name)
    }

    pub fn signal_channel_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.signal_channels
            .iter()
            .map(|(var, signal)| (var.as_str(), signal.as_str()))
    }

    /// Options in effect for the context argument of an execute call.
    pub fn options_for_context(&self, ctx_arg: &Node, source: &str) -> Option<ActivityOptions> {
        let ctx_arg = unwrap_expression(*ctx_arg);
        match ctx_arg.kind() {
            "identifier" => self
                .context_options_at(node_text(&ctx_arg, source), ctx_arg.start_byte())
                .cloned(),
            "call_expression" => self.options_from_with_call(&ctx_arg, source),
            _ => None,
        }
    }

    /// The latest binding of `name` that took effect before `offset`.
    fn context_options_at(&self, name: &str, offset: usize) -> Option<&ActivityOptions> {
        self.context_options
            .get(name)?
            .iter()
            .filter(|(effective, _)| *effective <= offset)
            .max_by_key(|(effective, _)| *effective)
            .map(|(_, options)| options)
    }

    fn bind_context_options(&mut self, name: &str, effective: usize, options: ActivityOptions) {
        self.context_options
            .entry(name.to_string())
            .or_default()
            .push((effective, options));
    }

    fn options_from_with_call(&self, call: &Node, source: &str) -> Option<ActivityOptions> {
        let member = selector_member(call, source)?;
        if !WITH_ACTIVITY_OPTIONS.contains(&member) {
            return None;
        }
        let args = call_arguments(call);
        resolve_options_expr(args.get(1)?, source, self)
    }

    /// Best-effort type text for an expression.
    pub fn infer_type(&self, expr: &Node, source: &str) -> String {
        let expr = unwrap_expression(*expr);
        match expr.kind() {
            "identifier" => self
                .types
                .get(node_text(&expr, source))
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            "interpreted_string_literal" | "raw_string_literal" => "string".to_string(),
            "int_literal" => "int".to_string(),
            "float_literal" => "float64".to_string(),
            "rune_literal" => "rune".to_string(),
            "true" | "false" => "bool".to_string(),
            "composite_literal" => expr
                .child_by_field_name("type")
                .map(|t| node_text(&t, source).to_string())
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            "unary_expression" => {
                let is_address_of = expr
                    .child_by_field_name("operator")
                    .is_some_and(|op| node_text(&op, source) == "&");
                match expr.child_by_field_name("operand") {
                    Some(operand) if is_address_of => {
                        let inner = self.infer_type(&operand, source);
                        if inner == UNKNOWN_TYPE {
                            inner
                        } else {
                            format!("*{}", inner)
                        }
                    }
                    _ => UNKNOWN_TYPE.to_string(),
                }
            }
            _ => UNKNOWN_TYPE.to_string(),
        }
    }

    fn bind_assignment(&mut self, node: &Node, source: &str) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        let names = named_children(&left);
        let values = named_children(&right);
        if names.len() != values.len() {
            return;
        }
        for (name, value) in names.iter().zip(values.iter()) {
            if name.kind() == "identifier" {
                self.bind(node_text(name, source), value, source);
            }
        }
    }

    fn bind_var_spec(&mut self, node: &Node, source: &str) {
        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        let declared = node
            .child_by_field_name("type")
            .map(|t| node_text(&t, source).to_string());
        let values = node
            .child_by_field_name("value")
            .map(|v| named_children(&v))
            .unwrap_or_default();

        for (index, name) in names.iter().enumerate() {
            let name = node_text(name, source);
            if let Some(declared) = &declared {
                self.types.insert(name.to_string(), declared.clone());
            }
            if let Some(value) = values.get(index) {
                self.bind(name, value, source);
            }
        }
    }

    fn bind(&mut self, name: &str, value: &Node, source: &str) {
        if name == "_" {
            return;
        }
        let value = unwrap_expression(*value);
        let inferred = self.infer_type(&value, source);
        if inferred != UNKNOWN_TYPE {
            self.types.insert(name.to_string(), inferred);
        }

        if is_activity_options_literal(&value, source) {
            let options = parse_activity_options(&value, source, self);
            self.option_literals.insert(name.to_string(), options);
        } else if is_retry_policy_literal(&value, source) {
            self.retry_policies
                .insert(name.to_string(), parse_retry_policy(&value, source));
        } else if value.kind() == "call_expression" {
            self.bind_call_result(name, &value, source);
        } else if value.kind() == "identifier" {
            // ctx2 := ctx keeps whatever options ctx carried
            let alias = node_text(&value, source);
            if let Some(options) = self.context_options_at(alias, value.start_byte()).cloned() {
                self.bind_context_options(name, value.end_byte(), options);
            }
        }
    }

    fn bind_call_result(&mut self, name: &str, call: &Node, source: &str) {
        let Some(member) = selector_member(call, source) else {
            return;
        };
        if WITH_ACTIVITY_OPTIONS.contains(&member) {
            if let Some(options) = self.options_from_with_call(call, source) {
                self.bind_context_options(name, call.end_byte(), options);
            }
        } else if member == GET_SIGNAL_CHANNEL {
            let args = call_arguments(call);
            if let Some(signal) = args.get(1).map(|arg| name_argument(arg, source)) {
                self.signal_channels.insert(name.to_string(), signal);
            }
        }
    }
}

/// Handler and signal names: string literals are unquoted, constants keep their identifier.
pub fn name_argument(arg: &Node, source: &str) -> String {
    let arg = unwrap_expression(*arg);
    string_literal_value(&arg, source).unwrap_or_else(|| node_text(&arg, source).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::go::parser::parse_source;
    use std::path::Path;

    fn scope_for(body_source: &str) -> LocalScope {
        let source = format!(
            "package p\n\nfunc F(ctx workflow.Context, id string) {{\n{}\n}}\n",
            body_source
        );
        let ast = parse_source(&source, Path::new("f.go")).unwrap();
        let root = ast.tree.root_node();
        let func = named_children(&root)
            .into_iter()
            .find(|n| n.kind() == "function_declaration")
            .unwrap();
        let params = vec![
            Parameter {
                name: "ctx".into(),
                type_text: "workflow.Context".into(),
                is_context: true,
            },
            Parameter {
                name: "id".into(),
                type_text: "string".into(),
                is_context: false,
            },
        ];
        LocalScope::build(&params, func.child_by_field_name("body"), &ast.source)
    }

    #[test]
    fn test_infers_declared_and_literal_types() {
        let scope = scope_for(
            "var result OrderResult\ncount := 3\nname := \"x\"\norder := &Order{ID: id}\nvar a, b int",
        );
        assert_eq!(scope.type_of("id"), Some("string"));
        assert_eq!(scope.type_of("result"), Some("OrderResult"));
        assert_eq!(scope.type_of("count"), Some("int"));
        assert_eq!(scope.type_of("name"), Some("string"));
        assert_eq!(scope.type_of("order"), Some("*Order"));
        assert_eq!(scope.type_of("b"), Some("int"));
    }

    #[test]
    fn test_tracks_context_options_through_variables() {
        let scope = scope_for(
            "ao := workflow.ActivityOptions{StartToCloseTimeout: time.Minute}\nctx = workflow.WithActivityOptions(ctx, ao)",
        );
        let options = scope.context_options_at("ctx", usize::MAX).expect("ctx options");
        assert!(options.has_timeout());
    }

    #[test]
    fn test_context_options_follow_statement_order() {
        let body = "ctx = workflow.WithActivityOptions(ctx, workflow.ActivityOptions{StartToCloseTimeout: time.Minute})\n\
                    first := 1\n\
                    ctx = workflow.WithActivityOptions(ctx, workflow.ActivityOptions{HeartbeatTimeout: time.Second})\n\
                    second := 2";
        let scope = scope_for(body);
        let source = format!(
            "package p\n\nfunc F(ctx workflow.Context, id string) {{\n{}\n}}\n",
            body
        );
        let at = |marker: &str| source.find(marker).unwrap();

        let early = scope.context_options_at("ctx", at("first")).unwrap();
        assert!(early.has_timeout());
        assert!(!early.has_heartbeat());

        let late = scope.context_options_at("ctx", at("second")).unwrap();
        assert!(late.has_heartbeat());
        assert!(!late.has_timeout());

        assert!(scope.context_options_at("ctx", at("ctx = ")).is_none());
    }

    #[test]
    fn test_tracks_signal_channels() {
        let scope = scope_for("ch := workflow.GetSignalChannel(ctx, \"approve\")");
        let vars: Vec<(&str, &str)> = scope.signal_channel_vars().collect();
        assert_eq!(vars, vec![("ch", "approve")]);
    }
}
