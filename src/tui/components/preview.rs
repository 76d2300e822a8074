//! # Preview Component
//!
//! Read-only view of the selected note below the item list: title, a meta
//! line, tags, then the body rendered as markdown.
//!
//! ```text
//! ┌ Preview ──────────────────────────────────────┐
//! │ Ship release                                  │
//! │ ☐ Todo • Priority: high • Due: Jan 20, 2025 … │
//! │ #work #q1                                     │
//! │                                               │
//! │ body…                                         │
//! └───────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::core::model::{Note, Priority};
use crate::tui::component::Component;
use crate::tui::markdown;
use crate::tui::theme::Palette;

const SEPARATOR: &str = " • ";

/// The parts of the meta line, in display order.
pub fn meta_parts(note: &Note) -> Vec<String> {
    let mut parts = Vec::new();
    if note.is_todo {
        parts.push(if note.is_done { "✓ Done" } else { "☐ Todo" }.to_string());
        if note.priority != Priority::None {
            parts.push(format!("Priority: {}", note.priority.label()));
        }
        if let Some(due) = note.due_at {
            parts.push(format!("Due: {}", due.with_timezone(&Local).format("%b %d, %Y")));
        }
    }
    if note.starred {
        parts.push("★ Starred".to_string());
    }
    parts.push(format!(
        "Updated: {}",
        note.updated_at.with_timezone(&Local).format("%b %d, %Y %H:%M")
    ));
    parts
}

pub struct Preview<'a> {
    pub note: Option<&'a Note>,
    pub palette: &'a Palette,
    pub now: DateTime<Utc>,
}

impl<'a> Preview<'a> {
    pub fn new(note: Option<&'a Note>, palette: &'a Palette) -> Self {
        Self {
            note,
            palette,
            now: Utc::now(),
        }
    }

    fn content(&self, note: &Note) -> Text<'static> {
        let p = self.palette;
        let mut text = Text::from(Line::from(Span::styled(
            note.title.clone(),
            Style::default().fg(p.text).add_modifier(Modifier::BOLD),
        )));

        let meta_style = if note.is_overdue(self.now) {
            Style::default().fg(p.error)
        } else {
            Style::default().fg(p.muted)
        };
        text.lines.push(Line::from(Span::styled(meta_parts(note).join(SEPARATOR), meta_style)));

        let tags: Vec<String> = note
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{t}"))
            .collect();
        if !tags.is_empty() {
            text.lines.push(Line::from(Span::styled(
                tags.join(" "),
                Style::default().fg(p.accent),
            )));
        }

        text.lines.push(Line::default());
        if note.body.trim().is_empty() {
            text.lines.push(Line::from(Span::styled(
                "Empty note. Press 'e' to edit.",
                Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
            )));
        } else {
            text.lines.extend(markdown::render(&note.body, p).lines);
        }
        text
    }
}

impl Component for Preview<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border(false))
            .title(" Preview ");

        let text = match self.note {
            Some(note) => self.content(note),
            None => Text::from(Span::styled(
                "Select a note to preview it.",
                Style::default().fg(self.palette.muted),
            )),
        };
        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }
}
