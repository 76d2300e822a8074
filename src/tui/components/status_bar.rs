//! Bottom line. A transient status message wins over the key hints; errors
//! are drawn in the error color.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{StatusKind, StatusMessage};
use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub const KEY_HINTS: &str = "n new • t todo • e edit • d delete • / search • ? help • q quit";

pub struct StatusBar {
    pub status: Option<StatusMessage>,
    pub loading: bool,
    pub palette: Palette,
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let p = &self.palette;
        let mut spans = Vec::new();
        if self.loading {
            spans.push(Span::styled(" Loading… ", Style::default().fg(p.accent)));
        }
        match &self.status {
            Some(message) => {
                let style = match message.kind {
                    StatusKind::Info => Style::default().fg(p.success),
                    StatusKind::Error => Style::default().fg(p.error).add_modifier(Modifier::BOLD),
                };
                spans.push(Span::styled(format!(" {}", message.text), style));
            }
            None => spans.push(Span::styled(format!(" {KEY_HINTS}"), Style::default().fg(p.muted))),
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
