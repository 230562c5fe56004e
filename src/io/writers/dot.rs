use crate::core::{NodeKind, TemporalGraph};
use crate::io::output::GraphWriter;
use std::collections::HashSet;
use std::io::Write;

pub struct DotWriter<W: Write> {
    writer: W,
}

impl<W: Write> DotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn node_style(kind: NodeKind) -> (&'static str, &'static str) {
    match kind {
        NodeKind::Workflow => ("box", "#cfe2ff"),
        NodeKind::Activity => ("ellipse", "#d1e7dd"),
        NodeKind::SignalHandler => ("cds", "#fff3cd"),
        NodeKind::QueryHandler => ("note", "#e2e3e5"),
        NodeKind::UpdateHandler => ("component", "#f8d7da"),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

impl<W: Write> GraphWriter for DotWriter<W> {
    fn write_graph(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        writeln!(self.writer, "digraph temporal {{")?;
        writeln!(self.writer, "    rankdir=LR;")?;
        writeln!(self.writer, "    node [fontname=\"Helvetica\", style=filled];")?;

        for node in graph.nodes() {
            let (shape, color) = node_style(node.kind);
            writeln!(
                self.writer,
                "    {} [shape={}, fillcolor={}, label={}];",
                quote(&node.name),
                shape,
                quote(color),
                quote(&format!("{}\\n{}", node.name, node.kind.as_str()))
            )?;
        }

        for node in graph.nodes() {
            let mut seen = HashSet::new();
            for call in node.calls.iter().filter(|c| graph.contains(&c.target)) {
                if !seen.insert((call.target.as_str(), call.kind)) {
                    continue;
                }
                writeln!(
                    self.writer,
                    "    {} -> {} [label={}];",
                    quote(&node.name),
                    quote(&call.target),
                    quote(call.kind.as_str())
                )?;
            }
        }

        writeln!(self.writer, "}}")?;
        Ok(())
    }
}
