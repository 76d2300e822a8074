use ratatui::Frame;

use crate::core::state::{App, Overlay, Panel};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{Header, Help, NoteList, Preview, Sidebar, StatusBar};
use crate::tui::layout;

/// Draw one frame. Component state must already be synced from `app`.
pub fn draw(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let palette = tui.palette;
    let area = frame.area();
    let layout = layout::compute(
        area,
        app.settings.sidebar_width,
        app.preview_visible,
        app.overlay == Overlay::Search,
    );
    let panels_active = matches!(app.overlay, Overlay::None);

    Header::new(app.scope_label(), palette).render(frame, layout.header);

    if let Some(search) = layout.search {
        tui.search.render(frame, search, &palette);
    }

    Sidebar::new(
        &mut tui.sidebar,
        panels_active && app.focus == Panel::Navigation,
        &palette,
    )
    .render(frame, layout.sidebar);

    let title = app.scope_label();
    NoteList::new(
        &mut tui.note_list,
        &title,
        panels_active && app.focus == Panel::Items,
        &palette,
    )
    .searching(app.scope.is_search())
    .render(frame, layout.items);

    if layout.preview.height > 0 {
        Preview::new(tui.note_list.selected_note(), &palette).render(frame, layout.preview);
    }

    StatusBar {
        status: app.status.clone(),
        loading: app.loading,
        palette,
    }
    .render(frame, layout.status);

    match &app.overlay {
        Overlay::Dialog(_) => {
            if let Some(dialog) = &tui.dialog {
                dialog.render(frame, area, &palette);
            }
        }
        Overlay::Help => Help { palette }.render(frame, area),
        Overlay::None | Overlay::Search | Overlay::EditorSuspended => {}
    }
}
