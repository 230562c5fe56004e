//! Interactive graph browser.
//!
//! [`app::BrowserApp`] owns all state and key handling; [`GraphBrowser`] is the thin
//! terminal shell around it.
//!
//! ```rust,no_run
//! use tempograph::core::TemporalGraph;
//! use tempograph::tui::GraphBrowser;
//!
//! let mut browser = GraphBrowser::new(TemporalGraph::default(), Vec::new())?;
//! browser.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod detail_view;
pub mod list_view;
pub mod nav_state;
pub mod theme;
pub mod tree_view;

use crate::core::TemporalGraph;
use crate::rules::Issue;
use anyhow::Result;
use app::BrowserApp;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

pub struct GraphBrowser {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: BrowserApp,
    restored: bool,
}

impl GraphBrowser {
    pub fn new(graph: TemporalGraph, issues: Vec<Issue>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            app: BrowserApp::new(graph, issues),
            restored: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        while !self.app.should_quit() {
            self.terminal.draw(|f| self.app.render(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        break;
                    }
                    self.app.handle_key(key.code);
                }
            }
        }
        self.cleanup()
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for GraphBrowser {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::debug!("Failed to restore terminal: {}", e);
        }
    }
}
