//! # Header Component
//!
//! Top line: application name and the scope the item list shows on the left,
//! today's date on the right.
//!
//! ```text
//!  Quill │ Work                                         Fri, Jan 17 2025
//! ```
//!
//! Purely presentational. All fields are props; the date is passed in rather
//! than read from the clock so rendering is deterministic.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub const APP_NAME: &str = "Quill";

pub struct Header {
    pub scope_label: String,
    pub date: String,
    pub palette: Palette,
}

impl Header {
    pub fn new(scope_label: String, palette: Palette) -> Self {
        Self {
            scope_label,
            date: Self::today(),
            palette,
        }
    }

    pub fn today() -> String {
        Local::now().format("%a, %b %d %Y").to_string()
    }
}

impl Component for Header {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let date_width = self.date.chars().count() as u16 + 1;
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(date_width)]).areas(area);

        let title = Line::from(vec![
            Span::styled(
                format!(" {APP_NAME}"),
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(self.palette.muted)),
            Span::styled(self.scope_label.clone(), Style::default().fg(self.palette.text)),
        ]);
        frame.render_widget(Paragraph::new(title), left);
        frame.render_widget(
            Paragraph::new(Span::styled(
                self.date.clone(),
                Style::default().fg(self.palette.muted),
            ))
            .alignment(Alignment::Right),
            right,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_header_shows_name_scope_and_date() {
        let backend = TestBackend::new(60, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut header = Header {
            scope_label: "Work".into(),
            date: "Wed, Jan 15 2025".into(),
            palette: Palette::default(),
        };
        terminal.draw(|f| header.render(f, f.area())).unwrap();
        let line: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(line.starts_with(" Quill │ Work"));
        assert!(line.trim_end().ends_with("Wed, Jan 15 2025"));
    }
}
