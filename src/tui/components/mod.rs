//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as props:
//! - `Header`: App name, current scope and date
//! - `StatusBar`: Transient message or key hints
//! - `Preview`: Markdown rendering of the selected note
//! - `Help`: Key reference overlay
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep a selection or a text buffer and emit events:
//! - `SidebarState`: Pseudo-folders plus the folder tree
//! - `NoteListState`: Items of the current scope
//! - `SearchBar`, `DialogState`: Overlay inputs built on `LineInput`
//!
//! Stateful components follow the persistent state + transient wrapper
//! pattern: the `*State` lives in `TuiState`, and a borrowing wrapper is
//! created each frame to render it. Data arrives through `set_*` calls after
//! every reducer step, never by reading `App` directly.
//!
//! ```text
//! components/
//! ├── mod.rs          (this file, shared text helpers)
//! ├── header.rs       (top line)
//! ├── status_bar.rs   (bottom line)
//! ├── sidebar.rs      (navigation panel)
//! ├── note_list.rs    (items panel)
//! ├── preview.rs      (selected note body)
//! ├── search_bar.rs   (query input)
//! ├── dialog.rs       (input + confirm dialogs)
//! ├── help.rs         (key reference)
//! └── line_input.rs   (single-line editor)
//! ```

pub mod dialog;
pub mod header;
pub mod help;
pub mod line_input;
pub mod note_list;
pub mod preview;
pub mod search_bar;
pub mod sidebar;
pub mod status_bar;

pub use dialog::{DialogEvent, DialogState};
pub use header::Header;
pub use help::Help;
pub use note_list::{NoteList, NoteListEvent, NoteListState};
pub use preview::Preview;
pub use search_bar::{SearchBar, SearchEvent};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use status_bar::StatusBar;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `max` display columns, ending in `…` if cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Right-pad `s` with spaces to `width` display columns.
pub fn pad(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        // Each CJK glyph is two columns wide.
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abcdef");
    }
}
