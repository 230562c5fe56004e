use super::{Issue, RuleKind};
use crate::core::{NodeKind, TemporalGraph, UNKNOWN_TYPE};

const UNTYPED_RETURNS: &[&str] = &["", "interface{}", "any"];

pub(super) fn missing_versioning(graph: &TemporalGraph, complexity: usize) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Workflow)
        .filter(|node| node.calls.len() >= complexity && node.versions.is_empty())
        .map(|node| {
            Issue::anchored(
                RuleKind::MissingVersioning,
                node,
                format!(
                    "Workflow '{}' has {} call sites but no GetVersion markers",
                    node.name,
                    node.calls.len()
                ),
            )
        })
        .collect()
}

pub(super) fn signal_without_handler(graph: &TemporalGraph) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Workflow)
        .flat_map(|node| {
            node.signals
                .iter()
                .filter(|signal| !signal.has_handler)
                .map(move |signal| {
                    Issue::anchored(
                        RuleKind::SignalWithoutHandler,
                        node,
                        format!(
                            "Signal '{}' in '{}' is never received",
                            signal.name, node.name
                        ),
                    )
                    .at_line(signal.line)
                })
        })
        .collect()
}

pub(super) fn query_without_typed_return(graph: &TemporalGraph) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Workflow)
        .flat_map(|node| {
            node.queries
                .iter()
                .filter(|query| query.return_type != UNKNOWN_TYPE)
                .filter(|query| UNTYPED_RETURNS.contains(&query.return_type.trim()))
                .map(move |query| {
                    let shown = if query.return_type.is_empty() {
                        "no value"
                    } else {
                        query.return_type.as_str()
                    };
                    Issue::anchored(
                        RuleKind::QueryWithoutTypedReturn,
                        node,
                        format!("Query '{}' in '{}' returns {}", query.name, node.name, shown),
                    )
                    .at_line(query.line)
                })
        })
        .collect()
}

pub(super) fn continue_as_new_review(graph: &TemporalGraph) -> Vec<Issue> {
    graph
        .nodes_of_kind(NodeKind::Workflow)
        .filter_map(|node| {
            let continuation = node.continue_as_new.as_ref()?;
            Some(
                Issue::anchored(
                    RuleKind::ContinueAsNewReview,
                    node,
                    format!(
                        "'{}' continues as new into '{}'; review the triggering condition",
                        node.name, continuation.target
                    ),
                )
                .at_line(continuation.line),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{build, call, workflow};
    use crate::core::{CallKind, ContinueAsNewDef, QueryDef, SignalDef, VersionDef};

    #[test]
    fn test_versioning_threshold_is_inclusive() {
        let mut busy = workflow("BusyWorkflow");
        let mut versioned = workflow("VersionedWorkflow");
        for line in 1..=5 {
            busy.calls.push(call("X", CallKind::Activity, line));
            versioned.calls.push(call("X", CallKind::Activity, line));
        }
        versioned.versions.push(VersionDef {
            change_id: "v2".into(),
            min_supported: "workflow.DefaultVersion".into(),
            max_supported: "1".into(),
            line: 3,
        });
        let mut small = workflow("SmallWorkflow");
        small.calls.push(call("X", CallKind::Activity, 1));

        let graph = build(vec![busy, versioned, small]);
        let issues = missing_versioning(&graph, 5);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].node_name, "BusyWorkflow");
    }

    #[test]
    fn test_signal_rule_uses_signal_line() {
        let mut wf = workflow("ApprovalWorkflow");
        wf.signals.push(SignalDef {
            name: "approve".into(),
            has_handler: true,
            line: 4,
        });
        wf.signals.push(SignalDef {
            name: "cancel".into(),
            has_handler: false,
            line: 9,
        });
        let issues = signal_without_handler(&build(vec![wf]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 9);
        assert!(issues[0].message.contains("cancel"));
    }

    #[test]
    fn test_query_rule_skips_unknown_and_typed() {
        let mut wf = workflow("StatusWorkflow");
        for (name, return_type) in [
            ("typed", "Status"),
            ("empty", ""),
            ("iface", "interface{}"),
            ("any", "any"),
            ("unresolved", UNKNOWN_TYPE),
        ] {
            wf.queries.push(QueryDef {
                name: name.into(),
                return_type: return_type.into(),
                line: 1,
            });
        }
        let issues = query_without_typed_return(&build(vec![wf]));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_every_continuation_is_flagged() {
        let mut wf = workflow("LoopWorkflow");
        wf.continue_as_new = Some(ContinueAsNewDef {
            target: "LoopWorkflow".into(),
            arg_count: 1,
            line: 20,
        });
        let graph = build(vec![wf, workflow("PlainWorkflow")]);
        let issues = continue_as_new_review(&graph);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 20);
    }
}
