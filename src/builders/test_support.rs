//! Small graph fixtures for unit tests.

use super::GraphBuilder;
use crate::core::{CallKind, CallSite, CancellationToken, NodeKind, TemporalGraph, TemporalNode};
use std::path::PathBuf;

pub fn workflow(name: &str) -> TemporalNode {
    TemporalNode::new(name, NodeKind::Workflow, PathBuf::from("flows.go"), 1)
}

pub fn activity(name: &str) -> TemporalNode {
    TemporalNode::new(name, NodeKind::Activity, PathBuf::from("activities.go"), 1)
}

pub fn call(target: &str, kind: CallKind, line: usize) -> CallSite {
    CallSite::new(target, kind, line)
}

/// Workflow nodes wired by child-workflow calls, one per edge, in edge order.
pub fn graph_from_edges(edges: &[(&str, &str)]) -> TemporalGraph {
    let mut nodes: Vec<TemporalNode> = Vec::new();
    for (line, (from, to)) in edges.iter().enumerate() {
        for name in [from, to] {
            if !nodes.iter().any(|n| n.name == *name) {
                nodes.push(workflow(name));
            }
        }
        if let Some(node) = nodes.iter_mut().find(|n| n.name == *from) {
            node.calls.push(call(to, CallKind::ChildWorkflow, line + 1));
        }
    }
    build(nodes)
}

pub fn build(nodes: Vec<TemporalNode>) -> TemporalGraph {
    let mut builder = GraphBuilder::new();
    for node in nodes {
        builder.add_node(node);
    }
    builder.build(&CancellationToken::new()).0
}
