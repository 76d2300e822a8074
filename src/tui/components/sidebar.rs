//! # Sidebar Component
//!
//! The navigation panel: four pseudo-folders followed by the visible rows of
//! the folder tree. Moving the cursor selects a scope immediately.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::core::model::FolderId;
use crate::core::notebook::NoteCounts;
use crate::core::state::ListScope;
use crate::core::tree::FolderTree;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{pad, truncate};
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

/// One selectable line of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub scope: ListScope,
    pub label: String,
    pub icon: String,
    pub depth: usize,
    pub count: Option<u64>,
    pub has_children: bool,
    pub expanded: bool,
    pub starred: bool,
}

impl SidebarRow {
    fn pseudo(scope: ListScope, label: &str, icon: &str, count: Option<u64>) -> Self {
        Self {
            scope,
            label: label.to_string(),
            icon: icon.to_string(),
            depth: 0,
            count,
            has_children: false,
            expanded: false,
            starred: false,
        }
    }

    pub fn folder_id(&self) -> Option<FolderId> {
        self.scope.folder_id()
    }
}

/// Rows for the current snapshot, pseudo-folders first.
pub fn build_rows(tree: &FolderTree, counts: &NoteCounts) -> Vec<SidebarRow> {
    let mut rows = vec![
        SidebarRow::pseudo(ListScope::All, "All Notes", "📚", Some(counts.total)),
        SidebarRow::pseudo(ListScope::Inbox, "Inbox", "📥", Some(counts.unfiled)),
        SidebarRow::pseudo(ListScope::Todos, "Todos", "☑", None),
        SidebarRow::pseudo(ListScope::Starred, "Starred", "★", None),
    ];
    rows.extend(tree.visible().map(|node| SidebarRow {
        scope: ListScope::Folder(node.folder.id),
        label: node.folder.name.clone(),
        icon: node.folder.icon.clone(),
        depth: node.depth,
        count: Some(node.note_count),
        has_children: !node.children.is_empty(),
        expanded: node.expanded,
        starred: node.folder.starred,
    }));
    rows
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Select(ListScope),
    ToggleExpand(FolderId),
    /// Enter: hand focus to the items panel.
    Activate,
    Star(FolderId),
    Delete { id: FolderId, name: String },
}

/// Persistent state for the navigation panel.
#[derive(Debug, Default)]
pub struct SidebarState {
    rows: Vec<SidebarRow>,
    selected: usize,
    list_state: ListState,
}

impl SidebarState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.list_state.select(Some(0));
        state
    }

    /// Replace the rows, keeping the cursor on the same scope when it
    /// still exists.
    pub fn set_rows(&mut self, rows: Vec<SidebarRow>) {
        let current = self.selected_row().map(|r| r.scope.clone());
        self.rows = rows;
        let index = current
            .and_then(|scope| self.rows.iter().position(|r| r.scope == scope))
            .unwrap_or(self.selected);
        self.select_index(index);
    }

    /// Put the cursor on `scope` if a row shows it.
    pub fn select_scope(&mut self, scope: &ListScope) {
        if let Some(index) = self.rows.iter().position(|r| r.scope == *scope) {
            self.select_index(index);
        }
    }

    pub fn rows(&self) -> &[SidebarRow] {
        &self.rows
    }

    pub fn selected_row(&self) -> Option<&SidebarRow> {
        self.rows.get(self.selected)
    }

    fn select_index(&mut self, index: usize) {
        self.selected = index.min(self.rows.len().saturating_sub(1));
        self.list_state
            .select(if self.rows.is_empty() { None } else { Some(self.selected) });
    }

    fn move_to(&mut self, index: usize) -> Option<SidebarEvent> {
        let before = self.selected;
        self.select_index(index);
        if self.selected == before {
            return None;
        }
        self.selected_row().map(|r| SidebarEvent::Select(r.scope.clone()))
    }
}

impl EventHandler for SidebarState {
    type Event = SidebarEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        if self.rows.is_empty() {
            return None;
        }
        match event {
            TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
                self.move_to(self.selected.saturating_sub(1))
            }
            TuiEvent::CursorDown | TuiEvent::InputChar('j') => self.move_to(self.selected + 1),
            TuiEvent::Home | TuiEvent::InputChar('g') => self.move_to(0),
            TuiEvent::End | TuiEvent::InputChar('G') => self.move_to(self.rows.len() - 1),
            TuiEvent::Submit => Some(SidebarEvent::Activate),
            TuiEvent::InputChar(' ') => {
                let row = self.selected_row()?;
                if row.has_children {
                    row.folder_id().map(SidebarEvent::ToggleExpand)
                } else {
                    None
                }
            }
            TuiEvent::InputChar('s') => self.selected_row()?.folder_id().map(SidebarEvent::Star),
            TuiEvent::InputChar('d') => {
                let row = self.selected_row()?;
                row.folder_id().map(|id| SidebarEvent::Delete {
                    id,
                    name: row.label.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the navigation panel.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    focused: bool,
    palette: &'a Palette,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut SidebarState, focused: bool, palette: &'a Palette) -> Self {
        Self {
            state,
            focused,
            palette,
        }
    }

    fn row_line(&self, row: &SidebarRow, width: usize, selected: bool) -> Line<'static> {
        let marker = match (row.has_children, row.expanded) {
            (true, true) => "▾ ",
            (true, false) => "▸ ",
            (false, _) => "  ",
        };
        let indent = "  ".repeat(row.depth);
        let star = if row.starred { " ★" } else { "" };
        let count = row.count.map(|c| format!(" {c}")).unwrap_or_default();

        let fixed = format!("{indent}{marker}{} ", row.icon);
        let room = width.saturating_sub(unicode_width::UnicodeWidthStr::width(fixed.as_str()) + count.len() + star.len());
        let label = pad(&format!("{}{star}", truncate(&row.label, room)), room + star.len());

        let style = if selected {
            self.palette.selection
        } else {
            Style::default().fg(self.palette.text)
        };
        Line::from(vec![
            Span::styled(fixed, style),
            Span::styled(label, style),
            Span::styled(count, style.patch(Style::default().add_modifier(Modifier::DIM))),
        ])
    }
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border(self.focused))
            .title(" Folders ");
        let width = usize::from(block.inner(area).width);

        let items: Vec<ListItem> = self
            .state
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| ListItem::new(self.row_line(row, width, i == self.state.selected)))
            .collect();

        frame.render_stateful_widget(List::new(items).block(block), area, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_folder;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::collections::{HashMap, HashSet};

    fn state_with_folders() -> SidebarState {
        let folders = vec![
            sample_folder(1, "Work", None),
            sample_folder(2, "Rust", Some(1)),
            sample_folder(3, "Home", None),
        ];
        let counts: HashMap<_, _> = [(1, 2)].into_iter().collect();
        let tree = FolderTree::build(&folders, &counts, &HashSet::new());
        let mut state = SidebarState::new();
        state.set_rows(build_rows(
            &tree,
            &NoteCounts {
                by_folder: counts,
                unfiled: 1,
                total: 3,
            },
        ));
        state
    }

    #[test]
    fn test_rows_start_with_pseudo_folders() {
        let state = state_with_folders();
        let scopes: Vec<_> = state.rows().iter().map(|r| r.scope.clone()).collect();
        assert_eq!(
            scopes,
            vec![
                ListScope::All,
                ListScope::Inbox,
                ListScope::Todos,
                ListScope::Starred,
                ListScope::Folder(3),
                ListScope::Folder(1),
            ]
        );
        assert_eq!(state.rows()[0].count, Some(3));
        assert!(state.rows()[5].has_children);
    }

    #[test]
    fn test_moving_selects_scope() {
        let mut state = state_with_folders();
        assert_eq!(
            state.handle_event(&TuiEvent::CursorDown),
            Some(SidebarEvent::Select(ListScope::Inbox))
        );
        assert_eq!(
            state.handle_event(&TuiEvent::InputChar('G')),
            Some(SidebarEvent::Select(ListScope::Folder(1)))
        );
        // Already at the bottom.
        assert_eq!(state.handle_event(&TuiEvent::CursorDown), None);
    }

    #[test]
    fn test_folder_actions_only_on_folders() {
        let mut state = state_with_folders();
        assert_eq!(state.handle_event(&TuiEvent::InputChar('d')), None);
        state.select_scope(&ListScope::Folder(1));
        assert_eq!(
            state.handle_event(&TuiEvent::InputChar(' ')),
            Some(SidebarEvent::ToggleExpand(1))
        );
        assert_eq!(
            state.handle_event(&TuiEvent::InputChar('d')),
            Some(SidebarEvent::Delete {
                id: 1,
                name: "Work".into()
            })
        );
        assert_eq!(state.handle_event(&TuiEvent::Submit), Some(SidebarEvent::Activate));
    }

    #[test]
    fn test_set_rows_keeps_cursor_on_scope() {
        let mut state = state_with_folders();
        state.select_scope(&ListScope::Folder(1));
        let mut rows = state.rows().to_vec();
        rows.remove(4); // "Home" disappears above the cursor
        state.set_rows(rows);
        assert_eq!(state.selected_row().unwrap().scope, ListScope::Folder(1));
    }

    #[test]
    fn test_render_shows_labels_and_counts() {
        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = state_with_folders();
        let palette = Palette::default();
        terminal
            .draw(|f| Sidebar::new(&mut state, true, &palette).render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Folders"));
        assert!(text.contains("All Notes"));
        assert!(text.contains("Work"));
    }
}
