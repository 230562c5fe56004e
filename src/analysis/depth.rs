//! Longest outbound call chains.
//!
//! Depth counts edges: a leaf has depth 0. A per-path guard stops traversal at any
//! node already on the current path, so cycles terminate. Results are memoized
//! only for subtrees whose traversal never hit the guard, since a truncated
//! result depends on the path taken to reach it.

use crate::core::{CancellationToken, TemporalGraph};
use std::collections::{HashMap, HashSet};

pub fn depth_of(graph: &TemporalGraph, name: &str, cancel: &CancellationToken) -> usize {
    let Some(node) = graph.get(name) else {
        return 0;
    };
    let mut walker = DepthWalker::new(graph, cancel);
    walker.longest(&node.name, &mut HashSet::new()).0
}

/// Depth of every root (node without parents), in name order.
pub fn root_depths(graph: &TemporalGraph, cancel: &CancellationToken) -> Vec<(String, usize)> {
    let mut walker = DepthWalker::new(graph, cancel);
    let mut depths = Vec::new();
    for root in graph.roots() {
        if cancel.is_cancelled() {
            log::debug!("Depth computation cancelled after {} roots", depths.len());
            break;
        }
        let (depth, _) = walker.longest(&root.name, &mut HashSet::new());
        depths.push((root.name.clone(), depth));
    }
    depths
}

/// Longest chain from any root; 0 when the graph has no roots.
pub fn max_depth(graph: &TemporalGraph, cancel: &CancellationToken) -> usize {
    root_depths(graph, cancel)
        .into_iter()
        .map(|(_, depth)| depth)
        .max()
        .unwrap_or(0)
}

struct DepthWalker<'g, 'c> {
    graph: &'g TemporalGraph,
    cancel: &'c CancellationToken,
    memo: HashMap<&'g str, usize>,
}

impl<'g, 'c> DepthWalker<'g, 'c> {
    fn new(graph: &'g TemporalGraph, cancel: &'c CancellationToken) -> Self {
        Self {
            graph,
            cancel,
            memo: HashMap::new(),
        }
    }

    /// Returns the depth and whether the per-path guard truncated the search.
    fn longest(&mut self, name: &'g str, on_path: &mut HashSet<&'g str>) -> (usize, bool) {
        if let Some(&depth) = self.memo.get(name) {
            return (depth, false);
        }
        if self.cancel.is_cancelled() {
            return (0, true);
        }

        on_path.insert(name);
        let mut best = 0;
        let mut truncated = false;
        for callee in self.graph.callees(name) {
            let callee = callee.name.as_str();
            if on_path.contains(callee) {
                truncated = true;
                continue;
            }
            let (depth, callee_truncated) = self.longest(callee, on_path);
            best = best.max(depth + 1);
            truncated |= callee_truncated;
        }
        on_path.remove(name);

        if !truncated {
            self.memo.insert(name, best);
        }
        (best, truncated)
    }
}
