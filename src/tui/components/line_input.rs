//! Single-line text field shared by the search bar and input dialogs.
//!
//! The cursor is a byte offset that always sits on a char boundary. Display
//! math uses `unicode-width` so wide glyphs keep the cursor aligned.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    buffer: String,
    /// Byte offset into `buffer`.
    cursor: usize,
}

/// Emitted when the text changes. Enter/Esc are left to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edited;

impl LineInput {
    #[cfg(test)]
    pub fn with_text(text: &str) -> Self {
        Self {
            buffer: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Display columns from the start of the buffer to the cursor.
    fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// Draw the visible slice of the buffer, scrolled so the cursor fits,
    /// and place the terminal cursor when `focused`.
    pub fn render(&self, frame: &mut Frame, area: Rect, style: Style, focused: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = usize::from(area.width.saturating_sub(1));
        let column = self.cursor_column();
        let skip = column.saturating_sub(width);

        let mut shown = String::new();
        let mut seen = 0;
        for ch in self.buffer.chars() {
            let w = ch.width().unwrap_or(0);
            if seen >= skip && seen + w <= skip + width + 1 {
                shown.push(ch);
            }
            seen += w;
        }

        frame.render_widget(Span::styled(shown, style), area);
        if focused {
            let x = area.x + (column - skip).min(width) as u16;
            frame.set_cursor_position(Position::new(x, area.y));
        }
    }
}

impl EventHandler for LineInput {
    type Event = Edited;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Edited> {
        match event {
            TuiEvent::InputChar(c) if !c.is_control() => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
                Some(Edited)
            }
            TuiEvent::Paste(text) => {
                let line: String = text.chars().filter(|c| !c.is_control()).collect();
                self.insert(&line);
                Some(Edited)
            }
            TuiEvent::Backspace => {
                let start = self.prev_boundary()?;
                self.buffer.replace_range(start..self.cursor, "");
                self.cursor = start;
                Some(Edited)
            }
            TuiEvent::Delete => {
                let end = self.next_boundary()?;
                self.buffer.replace_range(self.cursor..end, "");
                Some(Edited)
            }
            TuiEvent::CursorLeft => {
                if let Some(i) = self.prev_boundary() {
                    self.cursor = i;
                }
                None
            }
            TuiEvent::CursorRight => {
                if let Some(i) = self.next_boundary() {
                    self.cursor = i;
                }
                None
            }
            TuiEvent::Home => {
                self.cursor = 0;
                None
            }
            TuiEvent::End => {
                self.cursor = self.buffer.len();
                None
            }
            _ => None,
        }
    }
}
