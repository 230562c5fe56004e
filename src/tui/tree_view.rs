//! Call tree rooted at every node without parents.

use super::app::BrowserApp;
use crate::core::{NodeKind, TemporalGraph};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    pub kind: NodeKind,
    /// The node already appears on the path to this row.
    pub recursive: bool,
}

/// Flattens the call forest, depth-first in name order.
///
/// Nodes reachable only through a cycle get their own root so every node appears.
pub fn build_tree(graph: &TemporalGraph) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    let mut shown = HashSet::new();
    let mut path = Vec::new();

    for root in graph.roots() {
        push_subtree(graph, &root.name, 0, &mut path, &mut shown, &mut rows);
    }
    let missing: Vec<String> = graph
        .names()
        .filter(|name| !shown.contains(*name))
        .map(str::to_string)
        .collect();
    for name in missing {
        if !shown.contains(&name) {
            push_subtree(graph, &name, 0, &mut path, &mut shown, &mut rows);
        }
    }
    rows
}

fn push_subtree(
    graph: &TemporalGraph,
    name: &str,
    depth: usize,
    path: &mut Vec<String>,
    shown: &mut HashSet<String>,
    rows: &mut Vec<TreeRow>,
) {
    let Some(node) = graph.get(name) else {
        return;
    };
    let recursive = path.iter().any(|p| p == name);
    rows.push(TreeRow {
        depth,
        name: name.to_string(),
        kind: node.kind,
        recursive,
    });
    shown.insert(name.to_string());
    if recursive {
        return;
    }

    path.push(name.to_string());
    let mut seen = HashSet::new();
    for callee in graph.callees(name) {
        if seen.insert(callee.name.as_str()) {
            push_subtree(graph, &callee.name, depth + 1, path, shown, rows);
        }
    }
    path.pop();
}

pub fn render(frame: &mut Frame, app: &BrowserApp, area: Rect) {
    let theme = app.theme();
    let items: Vec<ListItem> = app
        .tree_rows()
        .iter()
        .map(|row| {
            let mut spans = vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(
                    row.name.clone(),
                    ratatui::style::Style::default().fg(theme.kind_color(row.kind)),
                ),
            ];
            if row.recursive {
                spans.push(Span::styled(" (cycle)", theme.label_style()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Call tree ", theme.title_style())),
        )
        .highlight_style(theme.selected_style());
    let mut state = ListState::default().with_selected(Some(app.selected()));
    frame.render_stateful_widget(list, area, &mut state);
}
