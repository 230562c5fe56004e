//! Call-site and marker extraction for one workflow or activity body.

use super::options::literal_has_field;
use super::parser::{
    call_arguments, named_children, node_line, node_text, selector_member, string_literal_value,
    unwrap_expression, visit_descendants,
};
use super::scope::{name_argument, LocalScope, GET_SIGNAL_CHANNEL};
use super::FunctionSignature;
use crate::core::{
    value_type_of, CallKind, CallSite, ContinueAsNewDef, NodeKind, QueryDef, SignalDef,
    TemporalNode, UpdateDef, VersionDef, UNKNOWN_TYPE,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tree_sitter::Node;

const EXECUTE_ACTIVITY: &str = "ExecuteActivity";
const EXECUTE_LOCAL_ACTIVITY: &str = "ExecuteLocalActivity";
const EXECUTE_CHILD_WORKFLOW: &str = "ExecuteChildWorkflow";
const SET_QUERY_HANDLER: &str = "SetQueryHandler";
const SET_UPDATE_HANDLER: &str = "SetUpdateHandler";
const SET_UPDATE_HANDLER_WITH_OPTIONS: &str = "SetUpdateHandlerWithOptions";
const GET_VERSION: &str = "GetVersion";
const NEW_CONTINUE_AS_NEW_ERROR: &str = "NewContinueAsNewError";
const TIMER_CALLS: &[&str] = &["Sleep", "NewTimer"];
const RECEIVE_CALLS: &[&str] = &["Receive", "ReceiveAsync", "ReceiveWithTimeout"];
const ADD_RECEIVE: &str = "AddReceive";
const FUTURE_GET: &str = "Get";

/// Everything found in one function body.
#[derive(Debug, Default)]
pub struct BodyFacts {
    pub calls: Vec<CallSite>,
    pub signals: Vec<SignalDef>,
    pub queries: Vec<QueryDef>,
    pub updates: Vec<UpdateDef>,
    pub versions: Vec<VersionDef>,
    pub continue_as_new: Option<ContinueAsNewDef>,
    pub uses_timers: bool,
    /// Signal/query/update handler nodes registered by the body.
    pub handlers: Vec<TemporalNode>,
}

/// Read-only inputs shared by every call inspected in one body.
pub struct BodyContext<'a> {
    pub source: &'a str,
    pub path: &'a Path,
    pub package: &'a str,
    pub owner: &'a str,
    pub owner_kind: NodeKind,
    pub scope: &'a LocalScope,
    pub workflow_aliases: &'a HashSet<String>,
    pub file_functions: &'a HashMap<String, FunctionSignature>,
}

pub fn collect_body_facts(body: Node, ctx: &BodyContext) -> BodyFacts {
    let received = received_channel_vars(body, ctx.source);
    let mut collector = Collector {
        ctx,
        received,
        facts: BodyFacts::default(),
        futures: HashMap::new(),
    };
    visit_descendants(body, &mut |node| {
        if node.kind() == "call_expression" {
            collector.on_call(&node);
        }
    });
    collector.facts
}

struct Collector<'a, 'c> {
    ctx: &'c BodyContext<'a>,
    received: HashSet<String>,
    facts: BodyFacts,
    /// Future variable name to the index of the call site that produced it.
    futures: HashMap<String, usize>,
}

impl Collector<'_, '_> {
    fn on_call(&mut self, call: &Node) {
        let source = self.ctx.source;
        let Some(member) = selector_member(call, source) else {
            return;
        };

        if member == FUTURE_GET {
            self.bind_future_result(call);
            return;
        }
        if !self.is_workflow_package_call(call) {
            return;
        }

        match member {
            EXECUTE_ACTIVITY => self.on_execute(call, CallKind::Activity),
            EXECUTE_LOCAL_ACTIVITY => self.on_execute(call, CallKind::LocalActivity),
            EXECUTE_CHILD_WORKFLOW => self.on_execute(call, CallKind::ChildWorkflow),
            GET_SIGNAL_CHANNEL => self.on_signal_channel(call),
            SET_QUERY_HANDLER => self.on_query_handler(call),
            SET_UPDATE_HANDLER | SET_UPDATE_HANDLER_WITH_OPTIONS => self.on_update_handler(call),
            GET_VERSION => self.on_version(call),
            NEW_CONTINUE_AS_NEW_ERROR => self.on_continue_as_new(call),
            m if TIMER_CALLS.contains(&m) => self.facts.uses_timers = true,
            _ => {}
        }
    }

    fn is_workflow_package_call(&self, call: &Node) -> bool {
        call.child_by_field_name("function")
            .and_then(|f| f.child_by_field_name("operand"))
            .is_some_and(|operand| {
                operand.kind() == "identifier"
                    && self
                        .ctx
                        .workflow_aliases
                        .contains(node_text(&operand, self.ctx.source))
            })
    }

    fn on_execute(&mut self, call: &Node, kind: CallKind) {
        let source = self.ctx.source;
        let args = call_arguments(call);
        let Some(target) = args.get(1).and_then(|arg| target_name(arg, source)) else {
            return;
        };

        let mut site = CallSite::new(target, kind, node_line(call));
        let payload = args.get(2..).unwrap_or_default();
        site.arg_count = payload.len();
        site.arg_types = payload
            .iter()
            .map(|arg| self.ctx.scope.infer_type(arg, source))
            .collect();
        if matches!(kind, CallKind::Activity | CallKind::LocalActivity) {
            site.options = args
                .first()
                .and_then(|ctx_arg| self.ctx.scope.options_for_context(ctx_arg, source));
        }
        site.result_type = self.chained_get_result(call);

        let index = self.facts.calls.len();
        if let Some(var) = assigned_variable(call, source) {
            self.futures.insert(var, index);
        }
        self.facts.calls.push(site);
    }

    /// `workflow.ExecuteActivity(...).Get(ctx, &out)` binds `out` directly.
    fn chained_get_result(&self, call: &Node) -> Option<String> {
        let selector = call.parent().filter(|p| p.kind() == "selector_expression")?;
        let field = selector.child_by_field_name("field")?;
        if node_text(&field, self.ctx.source) != FUTURE_GET {
            return None;
        }
        let get_call = selector.parent().filter(|p| p.kind() == "call_expression")?;
        self.result_binding_type(&get_call)
    }

    /// `future.Get(ctx, &out)` on a future assigned from an execute call.
    fn bind_future_result(&mut self, get_call: &Node) {
        let source = self.ctx.source;
        let Some(operand) = get_call
            .child_by_field_name("function")
            .and_then(|f| f.child_by_field_name("operand"))
        else {
            return;
        };
        if operand.kind() != "identifier" {
            return;
        }
        let Some(&index) = self.futures.get(node_text(&operand, source)) else {
            return;
        };
        if let Some(result_type) = self.result_binding_type(get_call) {
            if let Some(site) = self.facts.calls.get_mut(index) {
                site.result_type = Some(result_type);
            }
        }
    }

    fn result_binding_type(&self, get_call: &Node) -> Option<String> {
        let args = call_arguments(get_call);
        let out = unwrap_expression(*args.get(1)?);
        if out.kind() == "nil" {
            return None;
        }
        let target = if out.kind() == "unary_expression" {
            out.child_by_field_name("operand")?
        } else {
            out
        };
        if target.kind() != "identifier" {
            return Some(UNKNOWN_TYPE.to_string());
        }
        Some(
            self.ctx
                .scope
                .type_of(node_text(&target, self.ctx.source))
                .unwrap_or(UNKNOWN_TYPE)
                .to_string(),
        )
    }

    fn on_signal_channel(&mut self, call: &Node) {
        if self.ctx.owner_kind != NodeKind::Workflow {
            return;
        }
        let source = self.ctx.source;
        let args = call_arguments(call);
        let Some(name) = args.get(1).map(|arg| name_argument(arg, source)) else {
            return;
        };
        let has_handler = self.is_received_inline(call)
            || self
                .ctx
                .scope
                .signal_channel_vars()
                .any(|(var, signal)| signal == name && self.received.contains(var));
        let line = node_line(call);

        if let Some(existing) = self.facts.signals.iter_mut().find(|s| s.name == name) {
            existing.has_handler |= has_handler;
            return;
        }
        self.facts.signals.push(SignalDef {
            name: name.clone(),
            has_handler,
            line,
        });
        let handler = self.handler_node(&name, NodeKind::SignalHandler, line);
        self.register_handler(handler, CallKind::Signal, line);
    }

    /// `GetSignalChannel(..).Receive(..)` or `AddReceive(GetSignalChannel(..), ..)`.
    fn is_received_inline(&self, call: &Node) -> bool {
        let source = self.ctx.source;
        let Some(parent) = call.parent() else {
            return false;
        };
        match parent.kind() {
            "selector_expression" => parent
                .child_by_field_name("field")
                .is_some_and(|f| RECEIVE_CALLS.contains(&node_text(&f, source))),
            "argument_list" => parent
                .parent()
                .and_then(|outer| selector_member(&outer, source))
                .is_some_and(|m| m == ADD_RECEIVE),
            _ => false,
        }
    }

    fn on_query_handler(&mut self, call: &Node) {
        if self.ctx.owner_kind != NodeKind::Workflow {
            return;
        }
        let source = self.ctx.source;
        let args = call_arguments(call);
        let Some(name) = args.get(1).map(|arg| name_argument(arg, source)) else {
            return;
        };
        if self.facts.queries.iter().any(|q| q.name == name) {
            return;
        }
        let line = node_line(call);
        let signature = args.get(2).and_then(|h| self.handler_signature(h));
        let return_type = match &signature {
            Some(sig) => value_type_of(&sig.result).unwrap_or("").to_string(),
            None => UNKNOWN_TYPE.to_string(),
        };

        self.facts.queries.push(QueryDef {
            name: name.clone(),
            return_type,
            line,
        });
        let mut handler = self.handler_node(&name, NodeKind::QueryHandler, line);
        if let Some(sig) = signature {
            handler.parameters = sig.parameters;
            handler.return_type = sig.result;
        }
        self.register_handler(handler, CallKind::Query, line);
    }

    fn on_update_handler(&mut self, call: &Node) {
        if self.ctx.owner_kind != NodeKind::Workflow {
            return;
        }
        let source = self.ctx.source;
        let args = call_arguments(call);
        let Some(name) = args.get(1).map(|arg| name_argument(arg, source)) else {
            return;
        };
        if self.facts.updates.iter().any(|u| u.name == name) {
            return;
        }
        let line = node_line(call);
        let has_validator = args
            .get(3)
            .is_some_and(|opts| literal_has_field(opts, source, "Validator"));

        self.facts.updates.push(UpdateDef {
            name: name.clone(),
            has_validator,
            line,
        });
        let mut handler = self.handler_node(&name, NodeKind::UpdateHandler, line);
        if let Some(sig) = args.get(2).and_then(|h| self.handler_signature(h)) {
            handler.parameters = sig.parameters;
            handler.return_type = sig.result;
        }
        self.register_handler(handler, CallKind::Update, line);
    }

    fn on_version(&mut self, call: &Node) {
        let source = self.ctx.source;
        let args = call_arguments(call);
        let Some(change_id) = args.get(1).map(|arg| name_argument(arg, source)) else {
            return;
        };
        let text_at = |i: usize| {
            args.get(i)
                .map(|a| node_text(a, source).to_string())
                .unwrap_or_default()
        };
        self.facts.versions.push(VersionDef {
            change_id,
            min_supported: text_at(2),
            max_supported: text_at(3),
            line: node_line(call),
        });
    }

    fn on_continue_as_new(&mut self, call: &Node) {
        // Only the first continuation per workflow is retained.
        if self.facts.continue_as_new.is_some() {
            return;
        }
        let source = self.ctx.source;
        let args = call_arguments(call);
        let target = args
            .get(1)
            .and_then(|arg| target_name(arg, source))
            .unwrap_or_else(|| self.ctx.owner.to_string());
        self.facts.continue_as_new = Some(ContinueAsNewDef {
            target,
            arg_count: args.len().saturating_sub(2),
            line: node_line(call),
        });
    }

    fn handler_signature(&self, handler: &Node) -> Option<FunctionSignature> {
        let source = self.ctx.source;
        let handler = unwrap_expression(*handler);
        match handler.kind() {
            "func_literal" => Some(FunctionSignature::from_node(&handler, source)),
            "identifier" | "selector_expression" => {
                let name = target_name(&handler, source)?;
                self.ctx.file_functions.get(&name).cloned()
            }
            _ => None,
        }
    }

    fn handler_node(&self, name: &str, kind: NodeKind, line: usize) -> TemporalNode {
        let mut node = TemporalNode::new(
            format!("{}.{}", self.ctx.owner, name),
            kind,
            self.ctx.path.to_path_buf(),
            line,
        );
        node.package = self.ctx.package.to_string();
        node
    }

    fn register_handler(&mut self, handler: TemporalNode, kind: CallKind, line: usize) {
        let already_registered = self.facts.handlers.iter().any(|h| h.name == handler.name);
        if !already_registered {
            self.facts
                .calls
                .push(CallSite::new(handler.name.clone(), kind, line));
            self.facts.handlers.push(handler);
        }
    }
}

/// The referenced function: `Fn`, `recv.Method` (member name) or a registered name string.
pub fn target_name(arg: &Node, source: &str) -> Option<String> {
    let arg = unwrap_expression(*arg);
    match arg.kind() {
        "identifier" => Some(node_text(&arg, source).to_string()),
        "selector_expression" => arg
            .child_by_field_name("field")
            .map(|f| node_text(&f, source).to_string()),
        "interpreted_string_literal" | "raw_string_literal" => {
            string_literal_value(&arg, source).filter(|s| !s.is_empty())
        }
        _ => None,
    }
}

/// For `v := call(...)` or `v = call(...)`, the variable `v`.
fn assigned_variable(call: &Node, source: &str) -> Option<String> {
    let list = call.parent().filter(|p| p.kind() == "expression_list")?;
    let statement = list
        .parent()
        .filter(|p| matches!(p.kind(), "short_var_declaration" | "assignment_statement"))?;
    let left = statement.child_by_field_name("left")?;
    let right = named_children(&list);
    let position = right.iter().position(|n| n.id() == call.id())?;
    let names = named_children(&left);
    names
        .get(position)
        .filter(|n| n.kind() == "identifier")
        .map(|n| node_text(n, source).to_string())
        .filter(|name| name != "_")
}

/// Channel variables that are received from or handed to a selector.
fn received_channel_vars(body: Node, source: &str) -> HashSet<String> {
    let mut received = HashSet::new();
    visit_descendants(body, &mut |node| {
        if node.kind() != "call_expression" {
            return;
        }
        let Some(member) = selector_member(&node, source) else {
            return;
        };
        if RECEIVE_CALLS.contains(&member) {
            let operand = node
                .child_by_field_name("function")
                .and_then(|f| f.child_by_field_name("operand"));
            if let Some(operand) = operand.filter(|o| o.kind() == "identifier") {
                received.insert(node_text(&operand, source).to_string());
            }
        } else if member == ADD_RECEIVE {
            if let Some(first) = call_arguments(&node).first() {
                let first = unwrap_expression(*first);
                if first.kind() == "identifier" {
                    received.insert(node_text(&first, source).to_string());
                }
            }
        }
    });
    received
}
