//! Flat list of every node, sorted by name.

use super::app::BrowserApp;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(frame: &mut Frame, app: &BrowserApp, area: Rect) {
    let theme = app.theme();
    let items: Vec<ListItem> = app
        .graph()
        .nodes()
        .map(|node| {
            let issue_count = app.issues_for(&node.name).len();
            let mut spans = vec![
                Span::styled(
                    format!("{:<16}", node.kind.as_str()),
                    Style::default().fg(theme.kind_color(node.kind)),
                ),
                Span::styled(node.name.clone(), theme.text_style()),
            ];
            if issue_count > 0 {
                spans.push(Span::styled(
                    format!("  [{} issue(s)]", issue_count),
                    theme.label_style(),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(
        " Nodes ({} workflows, {} activities) ",
        app.graph().stats().workflows,
        app.graph().stats().activities
    );
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, theme.title_style())),
        )
        .highlight_style(theme.selected_style());
    let mut state = ListState::default().with_selected(Some(app.selected()));
    frame.render_stateful_widget(list, area, &mut state);
}
