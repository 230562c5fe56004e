//! Temporal pattern extraction for Go sources.
//!
//! Every top-level function and method is classified; workflows and activities
//! become [`TemporalNode`]s carrying their call sites and embedded definitions.
//! Handler registrations inside a workflow add one handler node each.

pub mod calls;
pub mod classify;
pub mod options;
pub mod parser;
pub mod scope;

use self::calls::{collect_body_facts, BodyContext};
use self::classify::{canonical_type, Classifier};
use self::parser::{
    has_parse_errors, named_children, node_line, node_text, parse_source, string_literal_value,
    visit_descendants, GoAst,
};
use self::scope::LocalScope;
use super::{FileFacts, PatternExtractor};
use crate::config::ExtractionConfig;
use crate::core::{Diagnostic, Parameter, TemporalNode};
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tree_sitter::Node;

pub const WORKFLOW_IMPORT_PATH: &str = "go.temporal.io/sdk/workflow";
const DEFAULT_WORKFLOW_ALIAS: &str = "workflow";

/// Parameter list and raw result text of a function-like node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionSignature {
    pub parameters: Vec<Parameter>,
    pub result: String,
}

impl FunctionSignature {
    /// Works for `function_declaration`, `method_declaration` and `func_literal`.
    /// Method receivers live in a separate field and are never included.
    pub fn from_node(func: &Node, source: &str) -> Self {
        let parameters = func
            .child_by_field_name("parameters")
            .map(|list| extract_parameters(&list, source))
            .unwrap_or_default();
        let result = func
            .child_by_field_name("result")
            .map(|r| node_text(&r, source).to_string())
            .unwrap_or_default();
        Self { parameters, result }
    }
}

fn extract_parameters(list: &Node, source: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    for decl in named_children(list) {
        if !matches!(
            decl.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        ) {
            continue;
        }
        let type_text = decl
            .child_by_field_name("type")
            .map(|t| node_text(&t, source).to_string())
            .unwrap_or_default();
        let type_text = if decl.kind() == "variadic_parameter_declaration" {
            format!("...{}", type_text)
        } else {
            type_text
        };

        let mut cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut cursor)
            .map(|n| node_text(&n, source).to_string())
            .collect();
        if names.is_empty() {
            parameters.push(Parameter {
                name: String::new(),
                type_text,
                is_context: false,
            });
        } else {
            parameters.extend(names.into_iter().map(|name| Parameter {
                name,
                type_text: type_text.clone(),
                is_context: false,
            }));
        }
    }
    parameters
}

pub struct GoExtractor {
    classifier: Classifier,
}

impl GoExtractor {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self::new(Classifier::from_config(config)?))
    }

    fn extract_ast(&self, ast: &GoAst) -> FileFacts {
        let source = ast.source.as_str();
        let root = ast.tree.root_node();
        let package = ast.package_name();
        let aliases = workflow_aliases(&root, source);
        let declarations: Vec<Node> = named_children(&root)
            .into_iter()
            .filter(|n| matches!(n.kind(), "function_declaration" | "method_declaration"))
            .collect();
        let file_functions: HashMap<String, FunctionSignature> = declarations
            .iter()
            .filter_map(|decl| {
                let name = decl.child_by_field_name("name")?;
                Some((
                    node_text(&name, source).to_string(),
                    FunctionSignature::from_node(decl, source),
                ))
            })
            .collect();

        let mut facts = FileFacts::new(ast.path.clone(), package.clone());
        if has_parse_errors(&ast.tree) {
            facts.diagnostics.push(Diagnostic::new(
                &ast.path,
                "syntax errors present; extracted best-effort",
            ));
        }

        for decl in &declarations {
            let Some(name_node) = decl.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(&name_node, source);
            let mut signature = file_functions.get(name).cloned().unwrap_or_default();
            let first_type = signature
                .parameters
                .first()
                .map(|p| canonical_type(&p.type_text, &aliases));
            let Some(kind) = self.classifier.classify(name, first_type.as_deref()) else {
                continue;
            };
            for param in &mut signature.parameters {
                param.is_context = self
                    .classifier
                    .is_context_type(&canonical_type(&param.type_text, &aliases));
            }

            let mut node = TemporalNode::new(name, kind, ast.path.clone(), node_line(decl));
            node.package = package.clone();
            node.doc = leading_doc(decl, source);
            node.return_type = signature.result.clone();

            if let Some(body) = decl.child_by_field_name("body") {
                let scope = LocalScope::build(&signature.parameters, Some(body), source);
                let ctx = BodyContext {
                    source,
                    path: &ast.path,
                    package: &package,
                    owner: name,
                    owner_kind: kind,
                    scope: &scope,
                    workflow_aliases: &aliases,
                    file_functions: &file_functions,
                };
                let body_facts = collect_body_facts(body, &ctx);
                node.calls = body_facts.calls;
                node.signals = body_facts.signals;
                node.queries = body_facts.queries;
                node.updates = body_facts.updates;
                node.versions = body_facts.versions;
                node.continue_as_new = body_facts.continue_as_new;
                node.uses_timers = body_facts.uses_timers;
                facts.nodes.extend(body_facts.handlers);
            }
            node.parameters = signature.parameters;
            log::trace!("{}: {} {}", ast.path.display(), node.kind, node.name);
            facts.nodes.push(node);
        }
        facts
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

impl PatternExtractor for GoExtractor {
    fn extract(&self, content: &str, path: &Path) -> Result<FileFacts> {
        let ast = parse_source(content, path)?;
        Ok(self.extract_ast(&ast))
    }
}

/// Local names under which the workflow package is imported.
fn workflow_aliases(root: &Node, source: &str) -> HashSet<String> {
    let mut aliases = HashSet::new();
    for decl in named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "import_declaration")
    {
        visit_descendants(decl, &mut |spec| {
            if spec.kind() != "import_spec" {
                return;
            }
            let path = spec
                .child_by_field_name("path")
                .and_then(|p| string_literal_value(&p, source));
            if path.as_deref() != Some(WORKFLOW_IMPORT_PATH) {
                return;
            }
            let alias = spec
                .child_by_field_name("name")
                .map(|n| node_text(&n, source).to_string())
                .unwrap_or_else(|| DEFAULT_WORKFLOW_ALIAS.to_string());
            aliases.insert(alias);
        });
    }
    if aliases.is_empty() {
        aliases.insert(DEFAULT_WORKFLOW_ALIAS.to_string());
    }
    aliases
}

/// Contiguous `//` comment lines directly above a declaration.
fn leading_doc(decl: &Node, source: &str) -> String {
    let mut lines = Vec::new();
    let mut expected_row = decl.start_position().row;
    let mut current = decl.prev_sibling();
    while let Some(comment) = current.filter(|n| n.kind() == "comment") {
        if comment.end_position().row + 1 != expected_row {
            break;
        }
        let text = node_text(&comment, source);
        let text = text
            .strip_prefix("//")
            .map(str::trim)
            .unwrap_or_else(|| text.trim_start_matches("/*").trim_end_matches("*/").trim());
        lines.push(text.to_string());
        expected_row = comment.start_position().row;
        current = comment.prev_sibling();
    }
    lines.reverse();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallKind, NodeKind, UNKNOWN_TYPE};
    use indoc::indoc;

    fn extract(source: &str) -> FileFacts {
        GoExtractor::default()
            .extract(source, Path::new("flows/order.go"))
            .unwrap()
    }

    fn node<'a>(facts: &'a FileFacts, name: &str) -> &'a TemporalNode {
        facts
            .nodes
            .iter()
            .find(|n| n.name == name)
            .unwrap_or_else(|| panic!("missing node {name}"))
    }

    #[test]
    fn test_extracts_workflow_with_activity_calls() {
        let facts = extract(indoc! {r#"
            package orders

            import (
                "time"

                "go.temporal.io/sdk/temporal"
                "go.temporal.io/sdk/workflow"
            )

            // OrderWorkflow charges and ships an order.
            func OrderWorkflow(ctx workflow.Context, order Order) (Receipt, error) {
                ao := workflow.ActivityOptions{
                    StartToCloseTimeout: time.Minute,
                    RetryPolicy: &temporal.RetryPolicy{MaximumAttempts: 3},
                }
                ctx = workflow.WithActivityOptions(ctx, ao)
                var receipt Receipt
                err := workflow.ExecuteActivity(ctx, ChargeActivity, order, "usd").Get(ctx, &receipt)
                if err != nil {
                    return receipt, err
                }
                workflow.Sleep(ctx, time.Hour)
                time.Sleep(time.Second)
                return receipt, nil
            }

            func ChargeActivity(ctx context.Context, order Order, currency string) (Receipt, error) {
                return Receipt{}, nil
            }
        "#});

        assert_eq!(facts.package, "orders");
        let workflow = node(&facts, "OrderWorkflow");
        assert_eq!(workflow.kind, NodeKind::Workflow);
        assert_eq!(workflow.doc, "OrderWorkflow charges and ships an order.");
        assert_eq!(workflow.return_type, "(Receipt, error)");
        assert!(workflow.uses_timers);
        assert_eq!(workflow.calls.len(), 1);

        let call = &workflow.calls[0];
        assert_eq!(call.target, "ChargeActivity");
        assert_eq!(call.kind, CallKind::Activity);
        assert_eq!(call.arg_count, 2);
        assert_eq!(call.arg_types, vec!["Order".to_string(), "string".to_string()]);
        assert_eq!(call.result_type.as_deref(), Some("Receipt"));
        let options = call.options.as_ref().expect("options");
        assert!(options.has_timeout());
        assert_eq!(
            options.retry_policy.as_ref().and_then(|r| r.maximum_attempts),
            Some(3)
        );

        let activity = node(&facts, "ChargeActivity");
        assert_eq!(activity.kind, NodeKind::Activity);
        assert_eq!(activity.parameters.len(), 3);
    }

    #[test]
    fn test_method_targets_use_member_name() {
        let facts = extract(indoc! {r#"
            package orders

            import "go.temporal.io/sdk/workflow"

            type Activities struct{}

            func (a *Activities) Reserve(ctx context.Context, sku string, qty int) error {
                return nil
            }

            func StockWorkflow(ctx workflow.Context) error {
                var a *Activities
                f := workflow.ExecuteLocalActivity(ctx, a.Reserve, "sku-1")
                var ok bool
                return f.Get(ctx, &ok)
            }
        "#});
        let activity = node(&facts, "Reserve");
        assert_eq!(activity.kind, NodeKind::Activity);
        assert_eq!(activity.parameters[0].type_text, "context.Context");

        let call = &node(&facts, "StockWorkflow").calls[0];
        assert_eq!(call.target, "Reserve");
        assert_eq!(call.kind, CallKind::LocalActivity);
        assert_eq!(call.arg_count, 1);
        assert_eq!(call.result_type.as_deref(), Some("bool"));
        assert!(call.options.is_none());
    }

    #[test]
    fn test_handlers_versions_and_continuation() {
        let facts = extract(indoc! {r#"
            package orders

            import wf "go.temporal.io/sdk/workflow"

            func getStatus() (string, error) { return "ok", nil }

            func ApprovalWorkflow(ctx wf.Context, round int) error {
                approve := wf.GetSignalChannel(ctx, "approve")
                _ = wf.GetSignalChannel(ctx, "cancel")
                _ = wf.SetQueryHandler(ctx, "status", getStatus)
                _ = wf.SetQueryHandler(ctx, "raw", func() (interface{}, error) { return nil, nil })
                _ = wf.SetUpdateHandlerWithOptions(ctx, "bump", func(ctx wf.Context, n int) error {
                    return nil
                }, wf.UpdateHandlerOptions{Validator: func(n int) error { return nil }})
                v := wf.GetVersion(ctx, "add-step", wf.DefaultVersion, 1)
                var decision string
                approve.Receive(ctx, &decision)
                _ = v
                if round < 3 {
                    return wf.NewContinueAsNewError(ctx, ApprovalWorkflow, round+1)
                }
                return wf.NewContinueAsNewError(ctx, "OtherWorkflow")
            }
        "#});

        let workflow = node(&facts, "ApprovalWorkflow");
        let signals: Vec<(&str, bool)> = workflow
            .signals
            .iter()
            .map(|s| (s.name.as_str(), s.has_handler))
            .collect();
        assert_eq!(signals, vec![("approve", true), ("cancel", false)]);

        assert_eq!(workflow.queries.len(), 2);
        assert_eq!(workflow.queries[0].return_type, "string");
        assert_eq!(workflow.queries[1].return_type, "interface{}");
        assert!(workflow.updates[0].has_validator);

        assert_eq!(workflow.versions.len(), 1);
        assert_eq!(workflow.versions[0].change_id, "add-step");
        assert_eq!(workflow.versions[0].max_supported, "1");

        let continuation = workflow.continue_as_new.as_ref().expect("continuation");
        assert_eq!(continuation.target, "ApprovalWorkflow");
        assert_eq!(continuation.arg_count, 1);

        assert_eq!(node(&facts, "ApprovalWorkflow.approve").kind, NodeKind::SignalHandler);
        assert_eq!(node(&facts, "ApprovalWorkflow.status").kind, NodeKind::QueryHandler);
        assert_eq!(node(&facts, "ApprovalWorkflow.bump").kind, NodeKind::UpdateHandler);
        let registration_kinds: Vec<CallKind> = workflow.calls.iter().map(|c| c.kind).collect();
        assert_eq!(
            registration_kinds,
            vec![
                CallKind::Signal,
                CallKind::Signal,
                CallKind::Query,
                CallKind::Query,
                CallKind::Update
            ]
        );
    }

    #[test]
    fn test_unrelated_functions_are_skipped() {
        let facts = extract(indoc! {r#"
            package util

            func Format(s string) string { return s }

            func helper(ctx context.Context) {}
        "#});
        let names: Vec<&str> = facts.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["helper"]);
        assert!(facts.diagnostics.is_empty());
    }

    #[test]
    fn test_unresolvable_arguments_are_unknown() {
        let facts = extract(indoc! {r#"
            package p

            import "go.temporal.io/sdk/workflow"

            func SyncWorkflow(ctx workflow.Context) error {
                return workflow.ExecuteChildWorkflow(ctx, "RemoteWorkflow", lookup()).Get(ctx, nil)
            }
        "#});
        let call = &node(&facts, "SyncWorkflow").calls[0];
        assert_eq!(call.target, "RemoteWorkflow");
        assert_eq!(call.kind, CallKind::ChildWorkflow);
        assert_eq!(call.arg_types, vec![UNKNOWN_TYPE.to_string()]);
        assert_eq!(call.result_type, None);
    }

    #[test]
    fn test_options_follow_reassignment_order() {
        let facts = extract(indoc! {r#"
            package orders

            import (
                "time"

                "go.temporal.io/sdk/temporal"
                "go.temporal.io/sdk/workflow"
            )

            func OrderWorkflow(ctx workflow.Context) error {
                short := workflow.ActivityOptions{StartToCloseTimeout: time.Minute}
                ctx = workflow.WithActivityOptions(ctx, short)
                if err := workflow.ExecuteActivity(ctx, ChargeActivity, 1).Get(ctx, nil); err != nil {
                    return err
                }
                long := workflow.ActivityOptions{
                    StartToCloseTimeout: time.Hour,
                    RetryPolicy: &temporal.RetryPolicy{MaximumAttempts: 5},
                }
                ctx = workflow.WithActivityOptions(ctx, long)
                return workflow.ExecuteActivity(ctx, ShipActivity, 1).Get(ctx, nil)
            }
        "#});
        let calls = &node(&facts, "OrderWorkflow").calls;
        assert_eq!(calls.len(), 2);

        assert_eq!(calls[0].target, "ChargeActivity");
        let charge = calls[0].options.as_ref().expect("charge options");
        assert!(charge.has_timeout());
        assert!(charge.retry_policy.is_none());

        assert_eq!(calls[1].target, "ShipActivity");
        let ship = calls[1].options.as_ref().expect("ship options");
        assert_eq!(
            ship.retry_policy.as_ref().and_then(|r| r.maximum_attempts),
            Some(5)
        );
    }

    #[test]
    fn test_aliased_workflow_import_classifies_by_signature() {
        let facts = extract(indoc! {r#"
            package orders

            import (
                "context"

                wf "go.temporal.io/sdk/workflow"
            )

            func Fulfil(ctx wf.Context, id string) error {
                return wf.ExecuteActivity(ctx, Pack, id).Get(ctx, nil)
            }

            func Pack(ctx context.Context, id string) error { return nil }
        "#});
        let fulfil = node(&facts, "Fulfil");
        assert_eq!(fulfil.kind, NodeKind::Workflow);
        assert!(fulfil.parameters[0].is_context);
        assert!(!fulfil.parameters[1].is_context);
        assert_eq!(fulfil.calls[0].target, "Pack");
        assert_eq!(node(&facts, "Pack").kind, NodeKind::Activity);
    }

    #[test]
    fn test_configured_context_types_mark_parameters() {
        let config = ExtractionConfig {
            activity_context_types: vec!["appctx.Ctx".into()],
            ..ExtractionConfig::default()
        };
        let facts = GoExtractor::from_config(&config)
            .unwrap()
            .extract(
                indoc! {r#"
                    package orders

                    func Reserve(ctx appctx.Ctx, sku string) error { return nil }
                "#},
                Path::new("flows/stock.go"),
            )
            .unwrap();
        let reserve = node(&facts, "Reserve");
        assert_eq!(reserve.kind, NodeKind::Activity);
        assert!(reserve.parameters[0].is_context);
        assert!(!reserve.parameters[1].is_context);
    }

    #[test]
    fn test_broken_source_yields_diagnostic() {
        let facts = extract("package p\n\nfunc BrokenWorkflow(ctx workflow.Context {\n");
        assert_eq!(facts.diagnostics.len(), 1);
    }
}
