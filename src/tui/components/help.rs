//! Key reference overlay, grouped into sections.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::component::Component;
use crate::tui::layout::centered_fixed;
use crate::tui::theme::Palette;

pub const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k ↑/↓", "Move up / down"),
            ("g/G", "First / last"),
            ("Tab ←/→", "Switch panel"),
            ("Enter", "Open folder / edit note"),
            ("Space", "Expand folder"),
            ("Esc", "Back to folders"),
        ],
    ),
    (
        "Actions",
        &[
            ("n", "New note"),
            ("t", "New todo"),
            ("f", "New folder"),
            ("e", "Edit in $EDITOR"),
            ("d", "Delete"),
            ("s", "Star"),
            ("x / Space", "Toggle done (todos)"),
            ("p", "Cycle priority (todos)"),
        ],
    ),
    (
        "Views",
        &[
            ("/", "Search"),
            ("v", "Toggle preview"),
            ("r", "Refresh"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    ),
];

pub struct Help {
    pub palette: Palette,
}

impl Help {
    fn lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD);
        let key = Style::default().fg(self.palette.text).add_modifier(Modifier::BOLD);
        let desc = Style::default().fg(self.palette.muted);

        let mut lines = Vec::new();
        for (section, keys) in SECTIONS {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(*section, heading)));
            for (k, d) in *keys {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {k:<12}"), key),
                    Span::styled(*d, desc),
                ]));
            }
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Press ? or Esc to close", desc)));
        lines
    }
}

impl Component for Help {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let area = centered_fixed(48, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border(true))
            .title(" Keyboard Shortcuts ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_help_lists_sections() {
        let backend = TestBackend::new(80, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut help = Help {
            palette: Palette::default(),
        };
        terminal.draw(|f| help.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        for section in ["Navigation", "Actions", "Views", "Toggle preview", "Press ? or Esc"] {
            assert!(text.contains(section), "missing {section}");
        }
    }
}
