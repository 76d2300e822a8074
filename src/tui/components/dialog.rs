//! # Dialog Component
//!
//! Modal box for the two dialog shapes:
//!
//! - input dialogs (new note, new todo, new folder): a line of text,
//!   Enter confirms with it, Esc cancels
//! - confirm dialogs (deletes): `y`/Enter confirms, `n`/Esc cancels
//!
//! The `DialogKind` itself stays in core; this state only owns the text
//! buffer and reports what the user chose.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::core::state::DialogKind;
use crate::tui::component::EventHandler;
use crate::tui::components::line_input::LineInput;
use crate::tui::event::TuiEvent;
use crate::tui::layout::centered_fixed;
use crate::tui::theme::Palette;

const DIALOG_WIDTH: u16 = 56;
const DIALOG_HEIGHT: u16 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// Accepted. Carries the typed text; empty for confirm dialogs.
    Confirm(String),
    Cancel,
}

#[derive(Debug, Clone)]
pub struct DialogState {
    kind: DialogKind,
    input: LineInput,
}

impl DialogState {
    pub fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            input: LineInput::default(),
        }
    }

    pub fn kind(&self) -> &DialogKind {
        &self.kind
    }

    pub fn render(&self, frame: &mut Frame, outer: Rect, palette: &Palette) {
        let area = centered_fixed(DIALOG_WIDTH, DIALOG_HEIGHT, outer);
        frame.render_widget(Clear, area);

        let border = if self.kind.is_confirm() {
            Style::default().fg(palette.error)
        } else {
            palette.border(true)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", self.kind.title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [prompt, field, _, hint] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let muted = Style::default().fg(palette.muted);
        if self.kind.is_confirm() {
            frame.render_widget(
                Paragraph::new(self.kind.prompt())
                    .style(Style::default().fg(palette.text).add_modifier(Modifier::BOLD))
                    .wrap(Wrap { trim: true }),
                prompt.union(field),
            );
            frame.render_widget(Paragraph::new(Span::styled("y confirm • n cancel", muted)), hint);
        } else {
            if self.input.value().is_empty() {
                frame.render_widget(Paragraph::new(Line::from(Span::styled(self.kind.prompt(), muted))), field);
            }
            self.input
                .render(frame, field, Style::default().fg(palette.text), true);
            frame.render_widget(
                Paragraph::new(Span::styled("Enter confirm • Esc cancel", muted)),
                hint,
            );
        }
    }
}

impl EventHandler for DialogState {
    type Event = DialogEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<DialogEvent> {
        if self.kind.is_confirm() {
            return match event {
                TuiEvent::Submit | TuiEvent::InputChar('y') | TuiEvent::InputChar('Y') => {
                    Some(DialogEvent::Confirm(String::new()))
                }
                TuiEvent::Escape | TuiEvent::InputChar('n') | TuiEvent::InputChar('N') => {
                    Some(DialogEvent::Cancel)
                }
                _ => None,
            };
        }
        match event {
            TuiEvent::Submit => Some(DialogEvent::Confirm(self.input.value().to_string())),
            TuiEvent::Escape => Some(DialogEvent::Cancel),
            other => {
                self.input.handle_event(other);
                None
            }
        }
    }
}
