use crate::core::{CancellationToken, TemporalGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One witness cycle: `path[0] -> path[1] -> ... -> path[0]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Cycle {
    pub path: Vec<String>,
}

impl Cycle {
    /// `A -> B -> A`
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        if let Some(first) = self.path.first() {
            parts.push(first);
        }
        parts.join(" -> ")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path.iter().any(|n| n == name)
    }
}

/// Detect cycles using DFS over resolved edges.
///
/// At least one cycle is reported per strongly-connected region reached; this is
/// not an enumeration of every elementary cycle. Roots are visited in name order,
/// so the result is deterministic.
pub fn detect_cycles(graph: &TemporalGraph, cancel: &CancellationToken) -> Vec<Cycle> {
    let mut search = CycleSearch {
        graph,
        visited: HashSet::new(),
        rec_stack: HashSet::new(),
        path: Vec::new(),
        cycles: Vec::new(),
    };

    for name in graph.names() {
        if cancel.is_cancelled() {
            log::debug!("Cycle search cancelled");
            break;
        }
        if !search.visited.contains(name) {
            search.visit(name);
        }
    }

    search.cycles
}

struct CycleSearch<'g> {
    graph: &'g TemporalGraph,
    visited: HashSet<&'g str>,
    rec_stack: HashSet<&'g str>,
    path: Vec<&'g str>,
    cycles: Vec<Cycle>,
}

impl<'g> CycleSearch<'g> {
    fn visit(&mut self, name: &'g str) {
        self.visited.insert(name);
        self.rec_stack.insert(name);
        self.path.push(name);

        for callee in self.graph.callees(name) {
            let dep = callee.name.as_str();
            if !self.visited.contains(dep) {
                self.visit(dep);
            } else if self.rec_stack.contains(dep) {
                self.record(dep);
            }
        }

        self.path.pop();
        self.rec_stack.remove(name);
    }

    fn record(&mut self, repeat: &str) {
        let Some(start) = self.path.iter().position(|n| *n == repeat) else {
            return;
        };
        let cycle = Cycle {
            path: self.path[start..].iter().map(|n| n.to_string()).collect(),
        };
        // Repeated call sites to the same target would report the same cycle again.
        if !self.cycles.contains(&cycle) {
            self.cycles.push(cycle);
        }
    }
}
