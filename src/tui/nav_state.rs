//! Navigation state machine with an explicit transition table and history.
//!
//! ```text
//!     List ◄──────► Tree
//!      │  ▲          │ ▲
//!      v  │          v │
//!     Detail ──► Detail (callee)
//!
//!     Help is reachable from everywhere; Back pops the history.
//! ```

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    List,
    Tree,
    Detail,
    Help,
}

/// All allowed transitions. Anything else is rejected.
pub const TRANSITIONS: &[(ViewMode, ViewMode)] = &[
    (ViewMode::List, ViewMode::Tree),
    (ViewMode::List, ViewMode::Detail),
    (ViewMode::List, ViewMode::Help),
    (ViewMode::Tree, ViewMode::List),
    (ViewMode::Tree, ViewMode::Detail),
    (ViewMode::Tree, ViewMode::Help),
    (ViewMode::Detail, ViewMode::Detail),
    (ViewMode::Detail, ViewMode::Help),
    (ViewMode::Help, ViewMode::List),
];

pub fn is_valid_transition(from: ViewMode, to: ViewMode) -> bool {
    TRANSITIONS.contains(&(from, to))
}

/// Where the user was: the view, its selection and the node shown in detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mode: ViewMode,
    pub selected: usize,
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    Success,
    Invalid { from: ViewMode, to: ViewMode },
    /// Nothing to go back to.
    AtStart,
}

impl NavigationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, NavigationResult::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub view_mode: ViewMode,
    pub history: Vec<HistoryEntry>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::List,
            history: Vec::new(),
        }
    }
}

impl NavigationState {
    /// Moves to `to`, remembering `current` so [`back`](Self::back) can restore it.
    pub fn navigate(&mut self, to: ViewMode, current: HistoryEntry) -> NavigationResult {
        if !is_valid_transition(self.view_mode, to) {
            return NavigationResult::Invalid {
                from: self.view_mode,
                to,
            };
        }
        self.history.push(current);
        self.view_mode = to;
        NavigationResult::Success
    }

    /// Switches between top-level views without growing the history.
    pub fn switch(&mut self, to: ViewMode) -> NavigationResult {
        if !is_valid_transition(self.view_mode, to) {
            return NavigationResult::Invalid {
                from: self.view_mode,
                to,
            };
        }
        self.view_mode = to;
        NavigationResult::Success
    }

    pub fn back(&mut self) -> Option<HistoryEntry> {
        let entry = self.history.pop()?;
        self.view_mode = entry.mode;
        Some(entry)
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mode: ViewMode, selected: usize) -> HistoryEntry {
        HistoryEntry {
            mode,
            selected,
            focus: None,
        }
    }

    #[test]
    fn test_back_restores_previous_view_and_selection() {
        let mut nav = NavigationState::default();
        assert!(nav.navigate(ViewMode::Detail, entry(ViewMode::List, 4)).is_success());
        assert_eq!(nav.view_mode, ViewMode::Detail);

        let restored = nav.back().unwrap();
        assert_eq!(restored.selected, 4);
        assert_eq!(nav.view_mode, ViewMode::List);
        assert!(nav.back().is_none());
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut nav = NavigationState::default();
        nav.view_mode = ViewMode::Help;
        let result = nav.navigate(ViewMode::Tree, entry(ViewMode::Help, 0));
        assert_eq!(
            result,
            NavigationResult::Invalid {
                from: ViewMode::Help,
                to: ViewMode::Tree
            }
        );
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_switch_keeps_history() {
        let mut nav = NavigationState::default();
        assert!(nav.switch(ViewMode::Tree).is_success());
        assert!(!nav.can_go_back());
        assert!(nav.switch(ViewMode::List).is_success());
    }
}
