use super::{Issue, RuleKind};
use crate::analysis::root_depths;
use crate::core::{CancellationToken, TemporalGraph};

pub(super) fn high_fan_out(graph: &TemporalGraph, max_fan_out: usize) -> Vec<Issue> {
    graph
        .nodes()
        .filter(|node| node.fan_out() > max_fan_out)
        .map(|node| {
            Issue::anchored(
                RuleKind::HighFanOut,
                node,
                format!(
                    "'{}' has {} call sites (threshold {})",
                    node.name,
                    node.fan_out(),
                    max_fan_out
                ),
            )
        })
        .collect()
}

/// One issue per root whose longest outbound chain exceeds the threshold.
pub(super) fn deep_call_chain(
    graph: &TemporalGraph,
    max_call_depth: usize,
    cancel: &CancellationToken,
) -> Vec<Issue> {
    root_depths(graph, cancel)
        .into_iter()
        .filter(|(_, depth)| *depth > max_call_depth)
        .filter_map(|(name, depth)| {
            let node = graph.get(&name)?;
            Some(Issue::anchored(
                RuleKind::DeepCallChain,
                node,
                format!(
                    "Call chain from '{}' is {} levels deep (threshold {})",
                    name, depth, max_call_depth
                ),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{activity, build, call, graph_from_edges, workflow};
    use crate::core::CallKind;

    fn workflow_with_calls(count: usize) -> crate::core::TemporalGraph {
        let mut wf = workflow("BusyWorkflow");
        for line in 0..count {
            wf.calls.push(call("StepActivity", CallKind::Activity, line + 1));
        }
        build(vec![wf, activity("StepActivity")])
    }

    #[test]
    fn test_fan_out_threshold_is_exclusive() {
        assert!(high_fan_out(&workflow_with_calls(15), 15).is_empty());
        let issues = high_fan_out(&workflow_with_calls(16), 15);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].node_name, "BusyWorkflow");
    }

    #[test]
    fn test_deep_chain_flags_root_only() {
        let graph = graph_from_edges(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let cancel = CancellationToken::new();
        assert!(deep_call_chain(&graph, 3, &cancel).is_empty());
        let issues = deep_call_chain(&graph, 2, &cancel);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].node_name, "A");
    }
}
