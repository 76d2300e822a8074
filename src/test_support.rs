//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use chrono::{TimeZone, Utc};

use crate::core::model::{Folder, FolderId, Note, NoteId, Priority, DEFAULT_FOLDER_ICON};
use crate::core::notebook::Notebook;
use crate::core::state::{App, Settings};

/// Creates a test App with default settings and the preview shown.
pub fn test_app() -> App {
    App::new(Settings::default(), true)
}

/// A seeded in-memory notebook.
pub fn test_notebook() -> Notebook {
    Notebook::in_memory().expect("in-memory notebook")
}

/// A plain note that was never stored. Timestamps are fixed.
pub fn sample_note(id: NoteId, title: &str) -> Note {
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
    Note {
        id,
        title: title.to_string(),
        body: String::new(),
        folder_id: None,
        template_id: None,
        is_todo: false,
        is_done: false,
        priority: Priority::None,
        due_at: None,
        tags: String::new(),
        starred: false,
        created_at: at,
        updated_at: at,
    }
}

pub fn sample_folder(id: FolderId, name: &str, parent: Option<FolderId>) -> Folder {
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
    Folder {
        id,
        name: name.to_string(),
        parent_id: parent,
        icon: DEFAULT_FOLDER_ICON.to_string(),
        position: 0,
        starred: false,
        created_at: at,
        updated_at: at,
    }
}
