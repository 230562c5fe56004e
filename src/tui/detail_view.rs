//! One node: declaration, calls, callers, payloads and issues.

use super::app::BrowserApp;
use super::theme::Theme;
use crate::core::{TemporalGraph, TemporalNode};
use crate::rules::Issue;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Callees a user can jump to from the detail view, in call order, deduplicated.
pub fn navigable_callees(node: &TemporalNode, graph: &TemporalGraph) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for call in &node.calls {
        if graph.contains(&call.target) && !targets.contains(&call.target) {
            targets.push(call.target.clone());
        }
    }
    targets
}

/// Plain-text content of the detail view; styling is applied in [`render`].
pub fn detail_lines(node: &TemporalNode, graph: &TemporalGraph, issues: &[Issue]) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", node.name, node.kind),
        format!("  {}:{}  package {}", node.file.display(), node.line, node.package),
    ];
    if !node.return_type.is_empty() {
        lines.push(format!("  returns {}", node.return_type));
    }
    if !node.parameters.is_empty() {
        let params: Vec<String> = node
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.name, p.type_text))
            .collect();
        lines.push(format!("  params ({})", params.join(", ")));
    }
    if !node.doc.is_empty() {
        lines.push(String::new());
        lines.extend(node.doc.lines().map(|l| format!("  {}", l)));
    }

    lines.push(String::new());
    lines.push(format!("Calls ({})", node.calls.len()));
    for call in &node.calls {
        let marker = if graph.contains(&call.target) { "" } else { " (unresolved)" };
        lines.push(format!(
            "  {:>5}  {:<15} {}{}",
            call.line,
            call.kind.as_str(),
            call.target,
            marker
        ));
    }

    lines.push(format!("Called by ({})", node.parents.len()));
    lines.extend(node.parents.iter().map(|p| format!("  {}", p)));

    if let Some(options) = &node.activity_options {
        lines.push("Activity options".to_string());
        let fields = [
            ("StartToCloseTimeout", &options.start_to_close_timeout),
            ("ScheduleToCloseTimeout", &options.schedule_to_close_timeout),
            ("ScheduleToStartTimeout", &options.schedule_to_start_timeout),
            ("HeartbeatTimeout", &options.heartbeat_timeout),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                lines.push(format!("  {}: {}", label, value));
            }
        }
        if options.retry_policy.is_some() {
            lines.push("  RetryPolicy: set".to_string());
        }
    }
    for signal in &node.signals {
        let state = if signal.has_handler { "received" } else { "never received" };
        lines.push(format!("Signal {} ({}) line {}", signal.name, state, signal.line));
    }
    for query in &node.queries {
        lines.push(format!("Query {} -> {} line {}", query.name, query.return_type, query.line));
    }
    for update in &node.updates {
        let validator = if update.has_validator { ", validated" } else { "" };
        lines.push(format!("Update {}{} line {}", update.name, validator, update.line));
    }
    for version in &node.versions {
        lines.push(format!(
            "Version {} [{}, {}] line {}",
            version.change_id, version.min_supported, version.max_supported, version.line
        ));
    }
    if let Some(can) = &node.continue_as_new {
        lines.push(format!("ContinueAsNew -> {} line {}", can.target, can.line));
    }

    lines.push(String::new());
    lines.push(format!("Issues ({})", issues.len()));
    for issue in issues {
        lines.push(format!(
            "  {}[{}] line {}: {}",
            issue.severity, issue.rule_id, issue.line, issue.message
        ));
    }
    lines
}

fn styled(line: &str, issues: &[Issue], theme: &Theme) -> Line<'static> {
    let text = line.to_string();
    if let Some(issue) = issues
        .iter()
        .find(|i| line.trim_start().starts_with(&format!("{}[{}]", i.severity, i.rule_id)))
    {
        return Line::from(Span::styled(text, theme.severity_style(issue.severity)));
    }
    if !line.starts_with(' ') && !line.is_empty() {
        return Line::from(Span::styled(text, theme.title_style()));
    }
    Line::from(Span::styled(text, theme.text_style()))
}

pub fn render(frame: &mut Frame, app: &BrowserApp, area: Rect) {
    let theme = app.theme();
    let Some(node) = app.focused_node() else {
        return;
    };
    let issues = app.issues_for(&node.name);
    let mut lines: Vec<Line> = detail_lines(node, app.graph(), issues)
        .iter()
        .map(|l| styled(l, issues, theme))
        .collect();

    let callees = navigable_callees(node, app.graph());
    if !callees.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Jump to", theme.title_style())));
        for (i, name) in callees.iter().enumerate() {
            let style = if i == app.selected() {
                theme.selected_style()
            } else {
                theme.text_style()
            };
            lines.push(Line::from(Span::styled(format!("  {}", name), style)));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Detail ", theme.title_style())),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
