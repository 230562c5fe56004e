use crate::core::{NodeKind, TemporalGraph, TemporalNode};
use crate::io::output::GraphWriter;
use std::io::Write;

/// Narrative report: summary table, one section per workflow, the activity
/// inventory and targets that never resolved.
pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_summary(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        let stats = graph.stats();
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        let rows = [
            ("Total nodes", stats.total_nodes),
            ("Workflows", stats.workflows),
            ("Activities", stats.activities),
            ("Signal handlers", stats.signal_handlers),
            ("Query handlers", stats.query_handlers),
            ("Update handlers", stats.update_handlers),
            ("Call sites", stats.total_call_sites),
            ("Unresolved call sites", stats.unresolved_call_sites),
            ("Max depth", stats.max_depth),
            ("Orphans", stats.orphan_count),
            ("Cycles", stats.cycle_count),
        ];
        for (label, value) in rows {
            writeln!(self.writer, "| {} | {} |", label, value)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_workflow(&mut self, graph: &TemporalGraph, node: &TemporalNode) -> anyhow::Result<()> {
        writeln!(self.writer, "### {}", node.name)?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Declared in `{}:{}` (package `{}`).",
            super::display_path(&node.file),
            node.line,
            node.package
        )?;
        if !node.doc.is_empty() {
            writeln!(self.writer)?;
            for line in node.doc.lines() {
                writeln!(self.writer, "> {}", line)?;
            }
        }
        writeln!(self.writer)?;

        if node.calls.is_empty() {
            writeln!(self.writer, "Makes no calls.")?;
        } else {
            writeln!(self.writer, "| Line | Kind | Target | Resolved |")?;
            writeln!(self.writer, "|------|------|--------|----------|")?;
            for call in &node.calls {
                writeln!(
                    self.writer,
                    "| {} | {} | `{}` | {} |",
                    call.line,
                    call.kind.as_str(),
                    call.target,
                    if graph.contains(&call.target) { "yes" } else { "no" }
                )?;
            }
        }
        writeln!(self.writer)?;

        let mut facts = Vec::new();
        if !node.signals.is_empty() {
            let names: Vec<_> = node.signals.iter().map(|s| s.name.as_str()).collect();
            facts.push(format!("Signals: {}", names.join(", ")));
        }
        if !node.queries.is_empty() {
            let names: Vec<_> = node.queries.iter().map(|q| q.name.as_str()).collect();
            facts.push(format!("Queries: {}", names.join(", ")));
        }
        if !node.updates.is_empty() {
            let names: Vec<_> = node.updates.iter().map(|u| u.name.as_str()).collect();
            facts.push(format!("Updates: {}", names.join(", ")));
        }
        if !node.versions.is_empty() {
            let ids: Vec<_> = node.versions.iter().map(|v| v.change_id.as_str()).collect();
            facts.push(format!("Version markers: {}", ids.join(", ")));
        }
        if let Some(can) = &node.continue_as_new {
            facts.push(format!("Continues as new into `{}` (line {})", can.target, can.line));
        }
        if node.uses_timers {
            facts.push("Uses durable timers".to_string());
        }
        facts.push(format!("Call depth: {}", graph.depth_of(&node.name)));

        for fact in facts {
            writeln!(self.writer, "- {}", fact)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_activities(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        let activities: Vec<_> = graph.nodes_of_kind(NodeKind::Activity).collect();
        if activities.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Activities")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Activity | Location | Callers | Timeout | Retry |")?;
        writeln!(self.writer, "|----------|----------|---------|---------|-------|")?;
        for node in activities {
            let options = node.activity_options.as_ref();
            writeln!(
                self.writer,
                "| {} | `{}:{}` | {} | {} | {} |",
                node.name,
                super::display_path(&node.file),
                node.line,
                if node.parents.is_empty() {
                    "-".to_string()
                } else {
                    node.parents.join(", ")
                },
                if options.is_some_and(|o| o.has_timeout()) { "yes" } else { "no" },
                if options.is_some_and(|o| o.retry_policy.is_some()) { "yes" } else { "no" },
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_unresolved(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        let unresolved: Vec<_> = graph
            .nodes()
            .flat_map(|node| {
                node.calls
                    .iter()
                    .filter(|call| !graph.contains(&call.target))
                    .map(move |call| (node, call))
            })
            .collect();
        if unresolved.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Unresolved Targets")?;
        writeln!(self.writer)?;
        for (node, call) in unresolved {
            writeln!(
                self.writer,
                "- `{}` called from {} at line {}",
                call.target, node.name, call.line
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> GraphWriter for MarkdownWriter<W> {
    fn write_graph(&mut self, graph: &TemporalGraph) -> anyhow::Result<()> {
        writeln!(self.writer, "# Temporal Workflow Graph")?;
        writeln!(self.writer)?;
        self.write_summary(graph)?;

        let workflows: Vec<_> = graph.nodes_of_kind(NodeKind::Workflow).collect();
        if !workflows.is_empty() {
            writeln!(self.writer, "## Workflows")?;
            writeln!(self.writer)?;
            for node in workflows {
                self.write_workflow(graph, node)?;
            }
        }

        self.write_activities(graph)?;

        let cycles = graph.cycles();
        if !cycles.is_empty() {
            writeln!(self.writer, "## Cycles")?;
            writeln!(self.writer)?;
            for cycle in cycles {
                writeln!(self.writer, "- {}", cycle.describe())?;
            }
            writeln!(self.writer)?;
        }

        self.write_unresolved(graph)?;
        Ok(())
    }
}
