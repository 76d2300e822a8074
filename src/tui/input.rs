//! Key routing: turns a `TuiEvent` into at most one core `Action`.
//!
//! Priority order:
//!
//! ```text
//! EditorSuspended  → swallow everything
//! ForceQuit        → Quit
//! Help             → close keys only
//! Search / Dialog  → the overlay's input owns the keyboard
//! global keys      → q ? / n t f v r, Tab and ←/→ switch panel
//! focused panel    → sidebar or note list
//! ```

use crate::core::action::Action;
use crate::core::state::{App, DialogKind, Overlay, Panel};
use crate::tui::TuiState;
use crate::tui::component::EventHandler;
use crate::tui::components::{DialogEvent, NoteListEvent, SearchEvent, SidebarEvent};
use crate::tui::event::TuiEvent;

pub fn handle_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    if app.overlay == Overlay::EditorSuspended {
        return None;
    }
    if matches!(event, TuiEvent::ForceQuit) {
        return Some(Action::Quit);
    }

    match &app.overlay {
        Overlay::Help => {
            return match event {
                TuiEvent::Escape
                | TuiEvent::Submit
                | TuiEvent::InputChar('?')
                | TuiEvent::InputChar('q') => Some(Action::CloseHelp),
                _ => None,
            };
        }
        Overlay::Search => {
            return match tui.search.handle_event(event)? {
                SearchEvent::Submit(text) => Some(Action::SubmitSearch(text)),
                SearchEvent::Cancel => Some(Action::CancelSearch),
            };
        }
        Overlay::Dialog(_) => {
            return match tui.dialog.as_mut()?.handle_event(event)? {
                DialogEvent::Confirm(text) => Some(Action::DialogConfirmed(text)),
                DialogEvent::Cancel => Some(Action::DialogCancelled),
            };
        }
        Overlay::None | Overlay::EditorSuspended => {}
    }

    if let Some(action) = global_key(event, app, tui) {
        return Some(action);
    }

    match app.focus {
        Panel::Navigation => match tui.sidebar.handle_event(event)? {
            SidebarEvent::Select(scope) => Some(Action::SelectScope(scope)),
            SidebarEvent::ToggleExpand(id) => Some(Action::ToggleExpanded(id)),
            SidebarEvent::Activate => Some(Action::FocusNext),
            SidebarEvent::Star(id) => Some(Action::ToggleFolderStar(id)),
            SidebarEvent::Delete { id, name } => {
                Some(Action::OpenDialog(DialogKind::DeleteFolder { id, name }))
            }
        },
        Panel::Items => match tui.note_list.handle_event(event)? {
            NoteListEvent::Edit(id) => Some(Action::EditNote(id)),
            NoteListEvent::Delete { id, title } => {
                Some(Action::OpenDialog(DialogKind::DeleteNote { id, title }))
            }
            NoteListEvent::Star(id) => Some(Action::ToggleStar(id)),
            NoteListEvent::ToggleDone(id) => Some(Action::ToggleDone(id)),
            NoteListEvent::CyclePriority(id) => Some(Action::CyclePriority(id)),
            NoteListEvent::Back if app.scope.is_search() => Some(Action::CancelSearch),
            NoteListEvent::Back => Some(Action::FocusPrev),
        },
    }
}

fn global_key(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    let folder = app.scope.folder_id();
    match event {
        TuiEvent::InputChar('q') => Some(Action::Quit),
        TuiEvent::InputChar('?') => Some(Action::OpenHelp),
        TuiEvent::InputChar('/') => {
            tui.search.reset();
            Some(Action::OpenSearch)
        }
        TuiEvent::InputChar('n') => Some(Action::OpenDialog(DialogKind::NewNote { folder })),
        TuiEvent::InputChar('t') => Some(Action::OpenDialog(DialogKind::NewTodo { folder })),
        TuiEvent::InputChar('f') => Some(Action::OpenDialog(DialogKind::NewFolder { parent: folder })),
        TuiEvent::InputChar('v') => Some(Action::TogglePreview),
        TuiEvent::InputChar('r') => Some(Action::Refresh),
        TuiEvent::Tab | TuiEvent::CursorRight => Some(Action::FocusNext),
        TuiEvent::BackTab | TuiEvent::CursorLeft => Some(Action::FocusPrev),
        _ => None,
    }
}
