//! The frozen analysis result handed to rules and exporters.

use super::{CancellationToken, NodeKind, TemporalNode};
use crate::analysis::{self, Cycle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub workflows: usize,
    pub activities: usize,
    pub signal_handlers: usize,
    pub query_handlers: usize,
    pub update_handlers: usize,
    pub total_call_sites: usize,
    pub unresolved_call_sites: usize,
    pub max_depth: usize,
    pub orphan_count: usize,
    pub cycle_count: usize,
}

impl GraphStats {
    pub fn count_for(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::Workflow => self.workflows,
            NodeKind::Activity => self.activities,
            NodeKind::SignalHandler => self.signal_handlers,
            NodeKind::QueryHandler => self.query_handlers,
            NodeKind::UpdateHandler => self.update_handlers,
        }
    }
}

/// Immutable snapshot of every node keyed by qualified name.
///
/// Iteration is always lexicographic by name so every exporter is deterministic.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TemporalGraph {
    nodes: BTreeMap<String, TemporalNode>,
    stats: GraphStats,
}

impl TemporalGraph {
    pub(crate) fn from_parts(nodes: BTreeMap<String, TemporalNode>, stats: GraphStats) -> Self {
        Self { nodes, stats }
    }

    pub(crate) fn stats_mut(&mut self) -> &mut GraphStats {
        &mut self.stats
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    pub fn get(&self, name: &str) -> Option<&TemporalNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TemporalNode> {
        self.nodes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &TemporalNode> {
        self.nodes.values().filter(move |n| n.kind == kind)
    }

    /// Registered targets of a node's call sites, in call order, duplicates kept.
    pub fn callees<'a>(&'a self, name: &str) -> Vec<&'a TemporalNode> {
        self.nodes
            .get(name)
            .map(|node| {
                node.calls
                    .iter()
                    .filter_map(|call| self.nodes.get(&call.target))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn fan_out(&self, name: &str) -> usize {
        self.nodes.get(name).map_or(0, TemporalNode::fan_out)
    }

    /// Nodes without incoming edges.
    pub fn roots(&self) -> impl Iterator<Item = &TemporalNode> {
        self.nodes.values().filter(|n| n.parents.is_empty())
    }

    pub fn has_outgoing_edges(&self, name: &str) -> bool {
        self.nodes
            .get(name)
            .is_some_and(|n| n.calls.iter().any(|c| self.nodes.contains_key(&c.target)))
    }

    /// Edges in the longest outbound chain from `name`.
    pub fn depth_of(&self, name: &str) -> usize {
        analysis::depth_of(self, name, &CancellationToken::new())
    }

    /// One witness per cycle reached by the search, in deterministic order.
    pub fn cycles(&self) -> Vec<Cycle> {
        analysis::detect_cycles(self, &CancellationToken::new())
    }

    /// A node with neither incoming nor outgoing resolved edges.
    pub fn is_orphan(&self, name: &str) -> bool {
        self.nodes
            .get(name)
            .is_some_and(|n| n.parents.is_empty() && !self.has_outgoing_edges(name))
    }
}
