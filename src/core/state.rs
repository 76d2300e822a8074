//! # Application State
//!
//! Core session state for Quill. This module contains domain logic only -
//! no TUI-specific types. Cursor positions and widget state live in the
//! `tui` module.
//!
//! ```text
//! App
//! ├── overlay: Overlay              // None | Search | Dialog(kind) | Help | EditorSuspended
//! ├── focus: Panel                  // Navigation | Items
//! ├── scope: ListScope              // what the item list shows
//! ├── base_scope: ListScope         // where Esc returns from search results
//! ├── folders, tree, counts         // navigation snapshot
//! ├── notes, snippets               // item snapshot
//! ├── templates                     // template snapshot
//! ├── items_epoch: u64              // bumped when the item list must reset
//! ├── status: Option<StatusMessage> // transient message
//! └── settings: Settings            // immutable config inputs
//! ```
//!
//! Snapshots are only ever replaced wholesale from a store query, never
//! patched in place. State changes only happen through `update(state,
//! action)` in action.rs.

use std::collections::{HashMap, HashSet};

use crate::core::config::{ResolvedConfig, Theme};
use crate::core::model::{
    Folder, FolderId, FolderScope, Note, NoteFilter, NoteId, SortField, Template,
};
use crate::core::notebook::NoteCounts;
use crate::core::tree::FolderTree;

/// The two focus targets of the ready state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Navigation,
    Items,
}

impl Panel {
    /// Focus cycles strictly between the two panels.
    pub fn other(self) -> Self {
        match self {
            Panel::Navigation => Panel::Items,
            Panel::Items => Panel::Navigation,
        }
    }
}

/// What a dialog is for. Stored with the overlay so the confirmation result
/// is dispatched to the right operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    NewNote { folder: Option<FolderId> },
    NewTodo { folder: Option<FolderId> },
    NewFolder { parent: Option<FolderId> },
    DeleteNote { id: NoteId, title: String },
    DeleteFolder { id: FolderId, name: String },
}

impl DialogKind {
    /// Confirm dialogs take yes/no; the rest take a line of text.
    pub fn is_confirm(&self) -> bool {
        matches!(self, DialogKind::DeleteNote { .. } | DialogKind::DeleteFolder { .. })
    }

    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::NewNote { .. } => "New Note",
            DialogKind::NewTodo { .. } => "New Todo",
            DialogKind::NewFolder { .. } => "New Folder",
            DialogKind::DeleteNote { .. } => "Delete Note",
            DialogKind::DeleteFolder { .. } => "Delete Folder",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            DialogKind::NewNote { .. } => "Enter note title...".to_string(),
            DialogKind::NewTodo { .. } => "Enter todo title...".to_string(),
            DialogKind::NewFolder { .. } => "Enter folder name...".to_string(),
            DialogKind::DeleteNote { title, .. } => format!("Delete '{title}'?"),
            DialogKind::DeleteFolder { name, .. } => {
                format!("Delete folder '{name}'? Its notes move to Inbox.")
            }
        }
    }
}

/// Modal layer above the panels. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Search,
    Dialog(DialogKind),
    Help,
    /// An edit was accepted: the handoff file is being prepared or the
    /// terminal belongs to the external editor. No input is legal.
    EditorSuspended,
}

/// What the item list is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListScope {
    #[default]
    All,
    /// Notes without a folder.
    Inbox,
    Todos,
    Starred,
    Folder(FolderId),
    Search(String),
}

impl ListScope {
    /// Folder new notes land in when created from this scope.
    pub fn folder_id(&self) -> Option<FolderId> {
        match self {
            ListScope::Folder(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, ListScope::Search(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// Matches the `StatusClear` that may remove this message.
    pub generation: u64,
}

/// Immutable inputs taken from configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
    pub sidebar_width: u16,
    pub show_completed: bool,
    pub todo_sort: SortField,
    pub default_folder: Option<String>,
    pub default_template: Option<String>,
}

impl Settings {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            theme: config.theme,
            sidebar_width: config.sidebar_width,
            show_completed: config.show_completed,
            todo_sort: config.todo_sort,
            default_folder: config.default_folder.clone(),
            default_template: config.default_template.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            sidebar_width: crate::core::config::DEFAULT_SIDEBAR_WIDTH,
            show_completed: true,
            todo_sort: SortField::Priority,
            default_folder: None,
            default_template: None,
        }
    }
}

pub struct App {
    pub overlay: Overlay,
    pub focus: Panel,
    pub scope: ListScope,
    pub base_scope: ListScope,
    pub folders: Vec<Folder>,
    pub counts: NoteCounts,
    pub expanded: HashSet<FolderId>,
    pub tree: FolderTree,
    pub notes: Vec<Note>,
    /// Search snippets keyed by note, only for search scopes.
    pub snippets: HashMap<NoteId, String>,
    pub templates: Vec<Template>,
    /// Bumped whenever the list must drop its selection (scope change).
    pub items_epoch: u64,
    pub status: Option<StatusMessage>,
    pub status_generation: u64,
    pub preview_visible: bool,
    /// An item load is in flight.
    pub loading: bool,
    pub settings: Settings,
}

impl App {
    pub fn new(settings: Settings, preview_visible: bool) -> Self {
        Self {
            overlay: Overlay::None,
            focus: Panel::Navigation,
            scope: ListScope::All,
            base_scope: ListScope::All,
            folders: Vec::new(),
            counts: NoteCounts::default(),
            expanded: HashSet::new(),
            tree: FolderTree::default(),
            notes: Vec::new(),
            snippets: HashMap::new(),
            templates: Vec::new(),
            items_epoch: 0,
            status: None,
            status_generation: 0,
            preview_visible,
            loading: false,
            settings,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(Settings::from_config(config), config.show_preview)
    }

    /// The listing filter for a non-search scope.
    pub fn filter_for(&self, scope: &ListScope) -> NoteFilter {
        match scope {
            ListScope::All | ListScope::Search(_) => NoteFilter::default(),
            ListScope::Inbox => NoteFilter {
                folder: FolderScope::Unfiled,
                ..Default::default()
            },
            ListScope::Todos => {
                let mut filter = NoteFilter::todos().sorted_by(self.settings.todo_sort);
                if !self.settings.show_completed {
                    filter.is_done = Some(false);
                }
                filter
            }
            ListScope::Starred => NoteFilter::starred(),
            ListScope::Folder(id) => NoteFilter::in_folder(*id),
        }
    }

    /// Header label for the item list.
    pub fn scope_label(&self) -> String {
        match &self.scope {
            ListScope::All => "All Notes".to_string(),
            ListScope::Inbox => "Inbox".to_string(),
            ListScope::Todos => "Todos".to_string(),
            ListScope::Starred => "Starred".to_string(),
            ListScope::Folder(id) => self
                .folders
                .iter()
                .find(|f| f.id == *id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| "Folder".to_string()),
            ListScope::Search(query) => format!("Search: {query}"),
        }
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn rebuild_tree(&mut self) {
        self.tree = FolderTree::build(&self.folders, &self.counts.by_folder, &self.expanded);
    }

    pub fn is_ready(&self) -> bool {
        self.overlay == Overlay::None
    }
}
