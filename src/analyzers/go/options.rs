//! Activity option literal parsing.
//!
//! Fields are matched by name; anything unrecognized is ignored so newer SDK fields
//! do not break extraction.

use super::parser::{named_children, node_text, unwrap_expression};
use super::scope::LocalScope;
use crate::core::{ActivityOptions, RetryPolicy};
use tree_sitter::Node;

const START_TO_CLOSE: &str = "StartToCloseTimeout";
const SCHEDULE_TO_CLOSE: &str = "ScheduleToCloseTimeout";
const SCHEDULE_TO_START: &str = "ScheduleToStartTimeout";
const HEARTBEAT: &str = "HeartbeatTimeout";
const RETRY_POLICY: &str = "RetryPolicy";

/// `pkg.ActivityOptions{...}` or `pkg.LocalActivityOptions{...}`.
pub fn is_activity_options_literal(node: &Node, source: &str) -> bool {
    literal_type_name(node, source).is_some_and(|t| t.ends_with("ActivityOptions"))
}

pub fn is_retry_policy_literal(node: &Node, source: &str) -> bool {
    literal_type_name(node, source).is_some_and(|t| t.ends_with(RETRY_POLICY))
}

fn literal_type_name<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    let literal = strip_address_of(*node);
    if literal.kind() != "composite_literal" {
        return None;
    }
    literal
        .child_by_field_name("type")
        .map(|t| node_text(&t, source))
}

/// `&T{...}` becomes `T{...}`.
fn strip_address_of(node: Node) -> Node {
    if node.kind() == "unary_expression" {
        if let Some(operand) = node.child_by_field_name("operand") {
            return operand;
        }
    }
    node
}

/// Key/value pairs of a composite literal, keys as text.
fn keyed_fields<'t>(literal: &Node<'t>, source: &str) -> Vec<(String, Node<'t>)> {
    let Some(body) = literal.child_by_field_name("body") else {
        return Vec::new();
    };
    named_children(&body)
        .into_iter()
        .filter(|element| element.kind() == "keyed_element")
        .filter_map(|element| {
            let parts = named_children(&element);
            let key = unwrap_expression(*parts.first()?);
            let value = unwrap_expression(*parts.last()?);
            (parts.len() >= 2).then(|| (node_text(&key, source).to_string(), value))
        })
        .collect()
}

/// Whether a composite literal (or `&literal`) sets `field`.
pub fn literal_has_field(literal: &Node, source: &str, field: &str) -> bool {
    let literal = strip_address_of(unwrap_expression(*literal));
    literal.kind() == "composite_literal"
        && keyed_fields(&literal, source)
            .iter()
            .any(|(key, _)| key == field)
}

pub fn parse_activity_options(literal: &Node, source: &str, scope: &LocalScope) -> ActivityOptions {
    let literal = strip_address_of(*literal);
    let mut options = ActivityOptions::default();
    for (key, value) in keyed_fields(&literal, source) {
        let text = Some(node_text(&value, source).to_string());
        match key.as_str() {
            START_TO_CLOSE => options.start_to_close_timeout = text,
            SCHEDULE_TO_CLOSE => options.schedule_to_close_timeout = text,
            SCHEDULE_TO_START => options.schedule_to_start_timeout = text,
            HEARTBEAT => options.heartbeat_timeout = text,
            RETRY_POLICY => options.retry_policy = resolve_retry_policy(&value, source, scope),
            _ => {}
        }
    }
    options
}

pub fn parse_retry_policy(literal: &Node, source: &str) -> RetryPolicy {
    let literal = strip_address_of(*literal);
    let mut policy = RetryPolicy::default();
    for (key, value) in keyed_fields(&literal, source) {
        let text = node_text(&value, source).trim();
        match key.as_str() {
            "MaximumAttempts" => policy.maximum_attempts = text.parse().ok(),
            "BackoffCoefficient" => policy.backoff_coefficient = text.parse().ok(),
            "InitialInterval" => policy.initial_interval = Some(text.to_string()),
            "MaximumInterval" => policy.maximum_interval = Some(text.to_string()),
            _ => {}
        }
    }
    policy
}

fn resolve_retry_policy(value: &Node, source: &str, scope: &LocalScope) -> Option<RetryPolicy> {
    if is_retry_policy_literal(value, source) {
        return Some(parse_retry_policy(value, source));
    }
    match value.kind() {
        "identifier" => scope.retry_policy(node_text(value, source)).cloned(),
        // `nil` and anything else we cannot see through
        _ => None,
    }
}

/// Options from an inline literal or a local variable bound to one.
pub fn resolve_options_expr(expr: &Node, source: &str, scope: &LocalScope) -> Option<ActivityOptions> {
    let expr = unwrap_expression(*expr);
    if is_activity_options_literal(&expr, source) {
        return Some(parse_activity_options(&expr, source, scope));
    }
    match expr.kind() {
        "identifier" => scope.options_literal(node_text(&expr, source)).cloned(),
        "unary_expression" => expr
            .child_by_field_name("operand")
            .and_then(|operand| resolve_options_expr(&operand, source, scope)),
        _ => None,
    }
}
