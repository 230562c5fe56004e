//! Browser state and key handling. Everything here is pure; terminal I/O lives in
//! [`super::GraphBrowser`].

use super::nav_state::{HistoryEntry, NavigationState, ViewMode};
use super::theme::Theme;
use super::tree_view::{build_tree, TreeRow};
use super::{detail_view, list_view, tree_view};
use crate::core::{TemporalGraph, TemporalNode};
use crate::rules::Issue;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::collections::BTreeMap;

const HELP_TEXT: &[&str] = &[
    "j/k or arrows   move selection",
    "enter           open detail / jump to callee",
    "t               call tree",
    "l               node list",
    "esc/backspace   back",
    "?               help",
    "q               quit",
];

pub struct BrowserApp {
    graph: TemporalGraph,
    issues: BTreeMap<String, Vec<Issue>>,
    tree: Vec<TreeRow>,
    nav: NavigationState,
    selected: usize,
    focus: Option<String>,
    should_quit: bool,
    theme: Theme,
}

impl BrowserApp {
    pub fn new(graph: TemporalGraph, issues: Vec<Issue>) -> Self {
        let mut by_node: BTreeMap<String, Vec<Issue>> = BTreeMap::new();
        for issue in issues {
            by_node.entry(issue.node_name.clone()).or_default().push(issue);
        }
        let tree = build_tree(&graph);
        Self {
            graph,
            issues: by_node,
            tree,
            nav: NavigationState::default(),
            selected: 0,
            focus: None,
            should_quit: false,
            theme: Theme::default(),
        }
    }

    pub fn graph(&self) -> &TemporalGraph {
        &self.graph
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn view_mode(&self) -> ViewMode {
        self.nav.view_mode
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn tree_rows(&self) -> &[TreeRow] {
        &self.tree
    }

    pub fn issues_for(&self, name: &str) -> &[Issue] {
        self.issues.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn focused_node(&self) -> Option<&TemporalNode> {
        self.focus.as_deref().and_then(|name| self.graph.get(name))
    }

    /// Name under the cursor in the list or tree view.
    pub fn selected_name(&self) -> Option<&str> {
        match self.nav.view_mode {
            ViewMode::List => self.graph.names().nth(self.selected),
            ViewMode::Tree => self.tree.get(self.selected).map(|r| r.name.as_str()),
            ViewMode::Detail => {
                let node = self.focused_node()?;
                let callees = detail_view::navigable_callees(node, &self.graph);
                let name = callees.get(self.selected)?;
                self.graph.get(name).map(|n| n.name.as_str())
            }
            ViewMode::Help => None,
        }
    }

    fn item_count(&self) -> usize {
        match self.nav.view_mode {
            ViewMode::List => self.graph.len(),
            ViewMode::Tree => self.tree.len(),
            ViewMode::Detail => self
                .focused_node()
                .map_or(0, |n| detail_view::navigable_callees(n, &self.graph).len()),
            ViewMode::Help => 0,
        }
    }

    fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            mode: self.nav.view_mode,
            selected: self.selected,
            focus: self.focus.clone(),
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let count = self.item_count();
        if count == 0 {
            self.selected = 0;
            return;
        }
        let max = count - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(max);
    }

    pub fn open_selected(&mut self) {
        let Some(name) = self.selected_name().map(str::to_string) else {
            return;
        };
        let entry = self.history_entry();
        if self.nav.navigate(ViewMode::Detail, entry).is_success() {
            self.focus = Some(name);
            self.selected = 0;
        }
    }

    pub fn show(&mut self, mode: ViewMode) {
        if self.nav.view_mode == ViewMode::Help {
            self.go_back();
        }
        if self.nav.view_mode == mode {
            return;
        }
        if self.nav.switch(mode).is_success() {
            self.selected = 0;
        }
    }

    pub fn show_help(&mut self) {
        let entry = self.history_entry();
        self.nav.navigate(ViewMode::Help, entry);
    }

    pub fn go_back(&mut self) {
        if let Some(entry) = self.nav.back() {
            self.selected = entry.selected;
            self.focus = entry.focus;
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('t') => self.show(ViewMode::Tree),
            KeyCode::Char('l') => self.show(ViewMode::List),
            KeyCode::Char('?') => self.show_help(),
            KeyCode::Esc | KeyCode::Backspace => {
                if self.nav.can_go_back() {
                    self.go_back();
                } else if key == KeyCode::Esc {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let [main, footer] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

        match self.nav.view_mode {
            ViewMode::List => list_view::render(frame, self, main),
            ViewMode::Tree => tree_view::render(frame, self, main),
            ViewMode::Detail => detail_view::render(frame, self, main),
            ViewMode::Help => {
                let lines: Vec<Line> = HELP_TEXT
                    .iter()
                    .map(|l| Line::from(Span::styled(*l, self.theme.text_style())))
                    .collect();
                frame.render_widget(Paragraph::new(lines), main);
            }
        }

        let stats = self.graph.stats();
        let status = format!(
            " {} nodes  {} call sites  depth {}  {} cycle(s)  ? help  q quit",
            stats.total_nodes, stats.total_call_sites, stats.max_depth, stats.cycle_count
        );
        frame.render_widget(
            Paragraph::new(Span::styled(status, self.theme.label_style())),
            footer,
        );
    }
}
