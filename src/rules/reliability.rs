use super::{CodeFix, Issue, RuleKind, TextReplacement};
use crate::core::{NodeKind, TemporalGraph, TemporalNode};
use regex::Regex;

const RETRY_POLICY_SNIPPET: &str = "ctx = workflow.WithActivityOptions(ctx, workflow.ActivityOptions{
\tStartToCloseTimeout: time.Minute,
\tRetryPolicy: &temporal.RetryPolicy{
\t\tInitialInterval:    time.Second,
\t\tBackoffCoefficient: 2.0,
\t\tMaximumAttempts:    5,
\t},
})
";

const TIMEOUT_SNIPPET: &str = "ctx = workflow.WithActivityOptions(ctx, workflow.ActivityOptions{
\tStartToCloseTimeout: time.Minute,
})
";

pub(super) fn missing_retry_policy(graph: &TemporalGraph) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Activity)
        .filter(|node| {
            node.activity_options
                .as_ref()
                .and_then(|o| o.retry_policy.as_ref())
                .is_none()
        })
        .map(|node| {
            let message = if node.activity_options.is_none() {
                format!("Activity '{}' is executed without activity options", node.name)
            } else {
                format!("Activity '{}' has no retry policy", node.name)
            };
            Issue::anchored(RuleKind::ActivityMissingRetryPolicy, node, message)
                .with_fix(options_fix(graph, node, RETRY_POLICY_SNIPPET))
        })
        .collect()
}

pub(super) fn missing_timeout(graph: &TemporalGraph) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Activity)
        .filter(|node| {
            node.activity_options
                .as_ref()
                .is_some_and(|o| !o.has_timeout())
        })
        .map(|node| {
            Issue::anchored(
                RuleKind::ActivityMissingTimeout,
                node,
                format!(
                    "Activity '{}' has options but no StartToClose, ScheduleToClose or ScheduleToStart timeout",
                    node.name
                ),
            )
            .with_fix(options_fix(graph, node, TIMEOUT_SNIPPET))
        })
        .collect()
}

pub(super) fn missing_heartbeat(graph: &TemporalGraph, long_running: &[Regex]) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Activity)
        .filter(|node| long_running.iter().any(|re| re.is_match(&node.name)))
        .filter(|node| {
            !node
                .activity_options
                .as_ref()
                .is_some_and(|o| o.has_heartbeat())
        })
        .map(|node| {
            Issue::anchored(
                RuleKind::ActivityMissingHeartbeat,
                node,
                format!(
                    "Activity '{}' looks long-running but sets no HeartbeatTimeout",
                    node.name
                ),
            )
        })
        .collect()
}

/// Insert an options block before the first call site that executes `node`.
fn options_fix(graph: &TemporalGraph, node: &TemporalNode, snippet: &str) -> Option<CodeFix> {
    let (caller, line) = node
        .parents
        .iter()
        .filter_map(|parent| graph.get(parent))
        .find_map(|caller| {
            caller
                .calls
                .iter()
                .filter(|call| call.target == node.name)
                .map(|call| call.line)
                .min()
                .map(|line| (caller, line))
        })?;

    Some(CodeFix {
        description: format!(
            "Configure activity options in '{}' before executing '{}'",
            caller.name, node.name
        ),
        replacements: vec![TextReplacement::insert_before(
            caller.file.clone(),
            line,
            snippet,
        )],
    })
}
