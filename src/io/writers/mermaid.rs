use crate::core::{NodeKind, TemporalGraph};
use crate::io::output::GraphWriter;
use std::collections::{HashMap, HashSet};
use std::io::Write;

pub struct MermaidWriter<W: Write> {
    writer: W,
}

impl<W: Write> MermaidWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
}

fn shaped(kind: NodeKind, label: &str) -> String {
    let label = escape_label(label);
    match kind {
        NodeKind::Workflow => format!("[\"{}\"]", label),
        NodeKind::Activity => format!("(\"{}\")", label),
        NodeKind::SignalHandler | NodeKind::QueryHandler | NodeKind::UpdateHandler => {
            format!("{{{{\"{}\"}}}}", label)
        }
    }
}

impl<W: Write> GraphWriter for MermaidWriter<W> {
    fn write_graph(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        let ids: HashMap<&str, String> = graph
            .names()
            .enumerate()
            .map(|(i, name)| (name, format!("n{}", i)))
            .collect();

        writeln!(self.writer, "flowchart LR")?;
        for node in graph.nodes() {
            if let Some(id) = ids.get(node.name.as_str()) {
                writeln!(self.writer, "    {}{}", id, shaped(node.kind, &node.name))?;
            }
        }

        for node in graph.nodes() {
            let mut seen = HashSet::new();
            for call in &node.calls {
                let (Some(from), Some(to)) = (
                    ids.get(node.name.as_str()),
                    ids.get(call.target.as_str()),
                ) else {
                    continue;
                };
                if seen.insert((call.target.as_str(), call.kind)) {
                    writeln!(self.writer, "    {} -->|{}| {}", from, call.kind.as_str(), to)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{activity, build, call, workflow};
    use crate::core::CallKind;

    #[test]
    fn test_mermaid_flowchart() {
        let mut wf = workflow("OrderWorkflow");
        wf.calls.push(call("ChargeActivity", CallKind::Activity, 3));
        let graph = build(vec![wf, activity("ChargeActivity")]);

        let mut buffer = Vec::new();
        MermaidWriter::new(&mut buffer).write_graph(&graph).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "flowchart LR\n    n0(\"ChargeActivity\")\n    n1[\"OrderWorkflow\"]\n    n1 -->|activity| n0\n"
        );
    }
}
