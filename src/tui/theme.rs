//! Colors and styles for the graph browser.

use crate::core::NodeKind;
use crate::rules::Severity;
use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub primary: Color,
    pub muted: Color,
    pub text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            muted: Color::DarkGray,
            text: Color::White,
        }
    }
}

impl Theme {
    pub fn kind_color(&self, kind: NodeKind) -> Color {
        match kind {
            NodeKind::Workflow => Color::Cyan,
            NodeKind::Activity => Color::Green,
            NodeKind::SignalHandler => Color::Yellow,
            NodeKind::QueryHandler => Color::Blue,
            NodeKind::UpdateHandler => Color::Magenta,
        }
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            Severity::Warning => Style::default().fg(Color::Yellow),
            Severity::Info => Style::default().fg(Color::Blue),
        }
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }
}
