use super::{Issue, RuleKind};
use crate::analysis::detect_cycles;
use crate::core::{CancellationToken, NodeKind, TemporalGraph};

/// Kinds never reported as orphans: parentless workflows are entry points and
/// handlers always hang off their registering workflow.
const ORPHAN_EXEMPT: &[NodeKind] = &[
    NodeKind::Workflow,
    NodeKind::SignalHandler,
    NodeKind::QueryHandler,
    NodeKind::UpdateHandler,
];

pub(super) fn circular_dependency(graph: &TemporalGraph, cancel: &CancellationToken) -> Vec<Issue> {
    detect_cycles(graph, cancel)
        .into_iter()
        .filter_map(|cycle| {
            let start = graph.get(cycle.path.first()?)?;
            let next = cycle.path.get(1).unwrap_or(&start.name);
            let line = start
                .calls
                .iter()
                .find(|call| &call.target == next)
                .map_or(start.line, |call| call.line);
            Some(
                Issue::anchored(
                    RuleKind::CircularDependency,
                    start,
                    format!("Circular dependency: {}", cycle.describe()),
                )
                .at_line(line),
            )
        })
        .collect()
}

pub(super) fn orphan_nodes(graph: &TemporalGraph) -> Vec<Issue> {
    graph
        .nodes()
        .filter(|node| !ORPHAN_EXEMPT.contains(&node.kind))
        .filter(|node| node.parents.is_empty() && node.is_exported())
        .map(|node| {
            Issue::anchored(
                RuleKind::OrphanNode,
                node,
                format!("{} '{}' is never called from scanned code", node.kind, node.name),
            )
        })
        .collect()
}
