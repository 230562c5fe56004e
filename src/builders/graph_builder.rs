//! Merge per-file facts into one frozen [`TemporalGraph`].
//!
//! The builder is the only writer: it owns the registry while files are added,
//! derives `parents`, inherited activity options and statistics exactly once in
//! [`GraphBuilder::build`], and then hands out an immutable snapshot.

use crate::analysis::{detect_cycles, max_depth};
use crate::analyzers::FileFacts;
use crate::core::{
    ActivityOptions, CancellationToken, Diagnostic, GraphStats, NodeKind, TemporalGraph,
    TemporalNode,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<String, TemporalNode>,
    diagnostics: Vec<Diagnostic>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files must be added in sorted path order for collisions to resolve deterministically.
    pub fn add_file(&mut self, facts: FileFacts) {
        self.diagnostics.extend(facts.diagnostics);
        for node in facts.nodes {
            self.add_node(node);
        }
    }

    /// Registers a node; a later declaration with the same name replaces the earlier one.
    pub fn add_node(&mut self, node: TemporalNode) {
        if let Some(previous) = self.nodes.get(&node.name) {
            let message = format!(
                "duplicate declaration of '{}' (previously {}:{}); keeping the one at line {}",
                node.name,
                previous.file.display(),
                previous.line,
                node.line
            );
            log::warn!("{}: {}", node.file.display(), message);
            self.diagnostics.push(Diagnostic::new(&node.file, message));
        }
        self.nodes.insert(node.name.clone(), node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Resolves edges, computes statistics and freezes the registry.
    pub fn build(self, cancel: &CancellationToken) -> (TemporalGraph, Vec<Diagnostic>) {
        let Self {
            mut nodes,
            diagnostics,
        } = self;

        resolve_parents(&mut nodes);
        inherit_activity_options(&mut nodes);
        let stats = base_stats(&nodes);

        let mut graph = TemporalGraph::from_parts(nodes, stats);
        let cycle_count = detect_cycles(&graph, cancel).len();
        let depth = max_depth(&graph, cancel);
        let stats = graph.stats_mut();
        stats.cycle_count = cycle_count;
        stats.max_depth = depth;

        log::debug!(
            "Built graph: {} nodes, {} call sites ({} unresolved), depth {}, {} cycles",
            graph.stats().total_nodes,
            graph.stats().total_call_sites,
            graph.stats().unresolved_call_sites,
            depth,
            cycle_count
        );
        (graph, diagnostics)
    }
}

/// Appends each caller to its resolved targets' `parents`, once per caller.
fn resolve_parents(nodes: &mut BTreeMap<String, TemporalNode>) {
    for node in nodes.values_mut() {
        node.parents.clear();
    }

    let mut edges: Vec<(String, String)> = Vec::new();
    for node in nodes.values() {
        for call in &node.calls {
            if nodes.contains_key(&call.target) {
                edges.push((node.name.clone(), call.target.clone()));
            }
        }
    }

    for (caller, target) in edges {
        if let Some(target) = nodes.get_mut(&target) {
            if !target.parents.contains(&caller) {
                target.parents.push(caller);
            }
        }
    }
}

/// Activities take the options of their first options-bearing call site,
/// callers visited in name order and call sites in line order.
fn inherit_activity_options(nodes: &mut BTreeMap<String, TemporalNode>) {
    let mut inherited: HashMap<String, ActivityOptions> = HashMap::new();
    for node in nodes.values() {
        let mut calls: Vec<_> = node.calls.iter().collect();
        calls.sort_by_key(|call| call.line);
        for call in calls {
            if let Some(options) = &call.options {
                inherited
                    .entry(call.target.clone())
                    .or_insert_with(|| options.clone());
            }
        }
    }

    for node in nodes.values_mut() {
        if node.kind == NodeKind::Activity && node.activity_options.is_none() {
            node.activity_options = inherited.remove(&node.name);
        }
    }
}

fn base_stats(nodes: &BTreeMap<String, TemporalNode>) -> GraphStats {
    let mut stats = GraphStats {
        total_nodes: nodes.len(),
        ..GraphStats::default()
    };

    for node in nodes.values() {
        match node.kind {
            NodeKind::Workflow => stats.workflows += 1,
            NodeKind::Activity => stats.activities += 1,
            NodeKind::SignalHandler => stats.signal_handlers += 1,
            NodeKind::QueryHandler => stats.query_handlers += 1,
            NodeKind::UpdateHandler => stats.update_handlers += 1,
        }
        stats.total_call_sites += node.calls.len();
        stats.unresolved_call_sites += node
            .calls
            .iter()
            .filter(|call| !nodes.contains_key(&call.target))
            .count();

        let has_outgoing = node.calls.iter().any(|call| nodes.contains_key(&call.target));
        if node.parents.is_empty() && !has_outgoing {
            stats.orphan_count += 1;
        }
    }
    stats
}
