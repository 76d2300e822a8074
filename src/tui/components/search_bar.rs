//! Query input shown above the panels while searching. Enter submits the
//! text as typed; Esc cancels.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::component::EventHandler;
use crate::tui::components::line_input::LineInput;
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Submit(String),
    Cancel,
}

#[derive(Debug, Default)]
pub struct SearchBar {
    input: LineInput,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.input.clear();
    }

    pub fn query(&self) -> &str {
        self.input.value()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(true))
            .title(" Search (Enter to search, Esc to cancel) ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.input
            .render(frame, inner, Style::default().fg(palette.text), true);
    }
}

impl EventHandler for SearchBar {
    type Event = SearchEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<SearchEvent> {
        match event {
            TuiEvent::Submit => Some(SearchEvent::Submit(self.input.value().to_string())),
            TuiEvent::Escape => Some(SearchEvent::Cancel),
            other => {
                self.input.handle_event(other);
                None
            }
        }
    }
}
