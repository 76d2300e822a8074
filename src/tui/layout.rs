//! # Screen Layout
//!
//! Pure geometry, recomputed from the frame area on every draw so a resize
//! needs no bookkeeping.
//!
//! ```text
//! ┌──────────────────────── header (1) ─────────────────────────┐
//! │ search bar (3, only while searching)                         │
//! ├──────────────┬───────────────────────────────────────────────┤
//! │              │ items                                         │
//! │  navigation  ├───────────────────────────────────────────────┤
//! │  (% width,   │ preview (PREVIEW_RATIO of the column, or 0)   │
//! │   clamped)   │                                               │
//! ├──────────────┴───────────────────────────────────────────────┤
//! └──────────────────────── status (1) ─────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Layout, Rect};

pub const SIDEBAR_MIN_WIDTH: u16 = 20;
pub const SIDEBAR_MAX_WIDTH: u16 = 40;
pub const SEARCH_BAR_HEIGHT: u16 = 3;
/// Share of the right column given to the preview.
pub const PREVIEW_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub search: Option<Rect>,
    pub sidebar: Rect,
    pub items: Rect,
    /// Zero height when the preview is hidden.
    pub preview: Rect,
    pub status: Rect,
}

/// Navigation width for a terminal `total` columns wide.
pub fn sidebar_width(total: u16, percent: u16) -> u16 {
    let wanted = (u32::from(total) * u32::from(percent) / 100) as u16;
    wanted.clamp(SIDEBAR_MIN_WIDTH, SIDEBAR_MAX_WIDTH).min(total)
}

/// Preview height for a right column `total` rows tall.
pub fn preview_height(total: u16, visible: bool) -> u16 {
    if !visible {
        return 0;
    }
    (f32::from(total) * PREVIEW_RATIO) as u16
}

pub fn compute(area: Rect, sidebar_percent: u16, preview_visible: bool, searching: bool) -> AppLayout {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let (search, body) = if searching {
        let [search, rest] =
            Layout::vertical([Constraint::Length(SEARCH_BAR_HEIGHT), Constraint::Min(0)]).areas(body);
        (Some(search), rest)
    } else {
        (None, body)
    };

    let width = sidebar_width(body.width, sidebar_percent);
    let [sidebar, right] =
        Layout::horizontal([Constraint::Length(width), Constraint::Min(0)]).areas(body);

    let preview_rows = preview_height(right.height, preview_visible);
    let [items, preview] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(preview_rows),
    ])
    .areas(right);

    AppLayout {
        header,
        search,
        sidebar,
        items,
        preview,
        status,
    }
}

/// A `width` x `height` rect centered in `outer`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, outer: Rect) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}
