use crate::core::{GraphStats, TemporalGraph, TemporalNode};
use crate::io::output::{GraphWriter, LintWriter};
use crate::rules::LintResult;
use serde::Serialize;
use std::io::Write;

/// Graph dump: statistics, nodes in name order and one witness per cycle.
#[derive(Serialize)]
struct GraphDocument<'a> {
    stats: &'a GraphStats,
    nodes: Vec<&'a TemporalNode>,
    cycles: Vec<String>,
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> GraphWriter for JsonWriter<W> {
    fn write_graph(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        let document = GraphDocument {
            stats: graph.stats(),
            nodes: graph.nodes().collect(),
            cycles: graph.cycles().iter().map(|c| c.describe()).collect(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> LintWriter for JsonWriter<W> {
    fn write_lint(&mut self, result: &LintResult) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(result)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::graph_from_edges;

    #[test]
    fn test_graph_json_lists_nodes_sorted() {
        let graph = graph_from_edges(&[("B", "A"), ("A", "B")]);
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer).write_graph(&graph).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["nodes"][0]["name"], "A");
        assert_eq!(value["nodes"][1]["name"], "B");
        assert_eq!(value["stats"]["cycle_count"], 1);
        assert_eq!(value["cycles"][0], "A -> B -> A");
    }
}
