//! # Note List Component
//!
//! The items panel. Shows the notes of the current scope, one row each:
//!
//! ```text
//! ☐ !! ★ Ship release                    Jan 15
//! 📄     Meeting notes                   Jan 14
//!        …discussed the <release> plan…            (search results only)
//! ```
//!
//! The selection survives reloads of the same scope (matched by note id) and
//! resets to the top when the scope changes, signalled by a new epoch.

use std::collections::HashMap;

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::model::{Note, NoteId, Priority};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{pad, truncate};
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

pub const EMPTY_TEXT: &str = "No notes yet. Press 'n' to create one.";
pub const NO_MATCHES_TEXT: &str = "No matching notes.";

const DATE_WIDTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteListEvent {
    Edit(NoteId),
    Delete { id: NoteId, title: String },
    Star(NoteId),
    ToggleDone(NoteId),
    CyclePriority(NoteId),
    /// Esc: return focus to navigation.
    Back,
}

#[derive(Debug)]
pub struct NoteListState {
    notes: Vec<Note>,
    snippets: HashMap<NoteId, String>,
    selected: usize,
    epoch: u64,
    /// Rows visible at the last render, for paging.
    page: usize,
    list_state: ListState,
}

impl Default for NoteListState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            snippets: HashMap::new(),
            selected: 0,
            epoch: 0,
            page: 10,
            list_state: ListState::default(),
        }
    }
}

impl NoteListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows. A changed `epoch` means a different scope, so the
    /// cursor goes back to the top.
    pub fn set_notes(&mut self, notes: Vec<Note>, snippets: HashMap<NoteId, String>, epoch: u64) {
        let keep = if epoch == self.epoch {
            self.selected_note().map(|n| n.id)
        } else {
            None
        };
        let fallback = if epoch == self.epoch { self.selected } else { 0 };
        self.epoch = epoch;
        self.notes = notes;
        self.snippets = snippets;

        let index = keep
            .and_then(|id| self.notes.iter().position(|n| n.id == id))
            .unwrap_or(fallback);
        self.select(index);
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.notes.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.notes.len().saturating_sub(1));
        self.list_state
            .select(if self.notes.is_empty() { None } else { Some(self.selected) });
    }
}

impl EventHandler for NoteListState {
    type Event = NoteListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<NoteListEvent> {
        if matches!(event, TuiEvent::Escape) {
            return Some(NoteListEvent::Back);
        }
        if self.notes.is_empty() {
            return None;
        }
        match event {
            TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
                self.select(self.selected.saturating_sub(1));
                None
            }
            TuiEvent::CursorDown | TuiEvent::InputChar('j') => {
                self.select(self.selected + 1);
                None
            }
            TuiEvent::Home | TuiEvent::InputChar('g') => {
                self.select(0);
                None
            }
            TuiEvent::End | TuiEvent::InputChar('G') => {
                self.select(self.notes.len() - 1);
                None
            }
            TuiEvent::PageUp => {
                self.select(self.selected.saturating_sub(self.page));
                None
            }
            TuiEvent::PageDown => {
                self.select(self.selected + self.page);
                None
            }
            TuiEvent::Submit | TuiEvent::InputChar('e') => {
                self.selected_note().map(|n| NoteListEvent::Edit(n.id))
            }
            TuiEvent::InputChar('d') => self.selected_note().map(|n| NoteListEvent::Delete {
                id: n.id,
                title: n.title.clone(),
            }),
            TuiEvent::InputChar('s') => self.selected_note().map(|n| NoteListEvent::Star(n.id)),
            TuiEvent::InputChar('x') | TuiEvent::InputChar(' ') => self
                .selected_note()
                .filter(|n| n.is_todo)
                .map(|n| NoteListEvent::ToggleDone(n.id)),
            TuiEvent::InputChar('p') => self
                .selected_note()
                .filter(|n| n.is_todo)
                .map(|n| NoteListEvent::CyclePriority(n.id)),
            _ => None,
        }
    }
}

/// Transient render wrapper for the items panel.
pub struct NoteList<'a> {
    state: &'a mut NoteListState,
    title: &'a str,
    focused: bool,
    searching: bool,
    palette: &'a Palette,
}

impl<'a> NoteList<'a> {
    pub fn new(state: &'a mut NoteListState, title: &'a str, focused: bool, palette: &'a Palette) -> Self {
        Self {
            state,
            title,
            focused,
            searching: false,
            palette,
        }
    }

    /// Search results: show snippets and a different empty text.
    pub fn searching(mut self, searching: bool) -> Self {
        self.searching = searching;
        self
    }

    fn row(&self, note: &Note, width: usize, selected: bool) -> ListItem<'static> {
        let p = self.palette;
        let base = if selected {
            p.selection
        } else {
            Style::default().fg(p.text)
        };

        let (mark, mark_style) = match (note.is_todo, note.is_done) {
            (true, true) => ("☑ ", base.fg(p.success)),
            (true, false) => ("☐ ", base),
            (false, _) => ("📄 ", base),
        };
        let priority = format!("{:<4}", note.priority.marker());
        let priority_style = if note.priority == Priority::None {
            base
        } else {
            base.fg(p.priority(note.priority))
        };
        let star = if note.starred { "★ " } else { "  " };
        let date = note.updated_at.with_timezone(&Local).format("%b %d").to_string();

        let fixed = mark.width() + priority.len() + star.width() + DATE_WIDTH + 1;
        let room = width.saturating_sub(fixed);
        let mut title_style = base;
        if note.is_done {
            title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
        }

        let mut lines = vec![Line::from(vec![
            Span::styled(mark, mark_style),
            Span::styled(priority, priority_style),
            Span::styled(star, base.fg(p.star)),
            Span::styled(pad(&truncate(&note.title, room), room), title_style),
            Span::styled(format!(" {date:>DATE_WIDTH$}"), base.fg(p.muted)),
        ])];

        if self.searching
            && let Some(snippet) = self.state.snippets.get(&note.id)
        {
            let indent = " ".repeat(mark.width() + 4);
            let room = width.saturating_sub(indent.len());
            lines.push(Line::from(vec![
                Span::raw(indent),
                Span::styled(
                    truncate(snippet, room),
                    Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
        ListItem::new(lines)
    }
}

impl Component for NoteList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border(self.focused))
            .title(format!(" 📝 {} ({}) ", self.title, self.state.notes.len()));
        let inner = block.inner(area);
        let rows_per_item = if self.searching { 2 } else { 1 };
        self.state.page = (usize::from(inner.height) / rows_per_item).max(1);

        if self.state.notes.is_empty() {
            let text = if self.searching { NO_MATCHES_TEXT } else { EMPTY_TEXT };
            let empty = Paragraph::new(Span::styled(text, Style::default().fg(self.palette.muted)))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let width = usize::from(inner.width);
        let items: Vec<ListItem> = self
            .state
            .notes
            .iter()
            .enumerate()
            .map(|(i, note)| self.row(note, width, i == self.state.selected))
            .collect();

        frame.render_stateful_widget(List::new(items).block(block), area, &mut self.state.list_state);
    }
}
