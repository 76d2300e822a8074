//! # Actions
//!
//! Everything that can happen in a Quill session becomes an `Action`.
//! User presses `/`? That's `Action::OpenSearch`.
//! A background load finishes? That's `Action::DataLoaded(snapshot)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the effects the adapter must carry out. No side
//! effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Vec<Effect>
//!                                        │
//!            ┌───────────────┬───────────┼──────────────┬──────────────┐
//!            ▼               ▼           ▼              ▼              ▼
//!          Load           Mutate    PrepareEdit     RunEditor     ClearStatusAfter
//!     (spawn_blocking) (spawn_blocking) (spawn_blocking) (blocks loop)  (tokio sleep)
//!            │               │           │              │              │
//!            └──── exactly one Action back through the channel ────────┘
//! ```
//!
//! Every background task answers with exactly one action, so the loop never
//! has to correlate partial results.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use log::{debug, info};

use crate::core::editor::{EditorExit, PreparedEdit};
use crate::core::error::Error;
use crate::core::model::{Folder, FolderId, Note, NoteFilter, NoteId, Template};
use crate::core::notebook::NoteCounts;
use crate::core::state::{App, DialogKind, ListScope, Overlay, Panel, StatusKind, StatusMessage};

/// Info messages expire after this long.
pub const INFO_STATUS_DELAY: Duration = Duration::from_secs(2);
/// Error messages stay a little longer.
pub const ERROR_STATUS_DELAY: Duration = Duration::from_secs(3);
/// Context of a failed editor preparation. Releases the suspended overlay.
pub const EDIT_FAILED: &str = "Edit failed";

// ============================================================================
// Action
// ============================================================================

#[derive(Debug)]
pub enum Action {
    Quit,

    // Overlays
    OpenHelp,
    CloseHelp,
    OpenSearch,
    /// Run a query and show its results in the item list.
    SubmitSearch(String),
    /// Leave search: closes the overlay and drops search results.
    CancelSearch,
    OpenDialog(DialogKind),
    /// The open dialog was accepted. `input` is empty for confirm dialogs.
    DialogConfirmed(String),
    DialogCancelled,

    // Panels
    FocusNext,
    FocusPrev,
    SelectScope(ListScope),
    ToggleExpanded(FolderId),
    TogglePreview,
    Refresh,

    // Item operations
    EditNote(NoteId),
    ToggleStar(NoteId),
    ToggleDone(NoteId),
    CyclePriority(NoteId),
    ToggleFolderStar(FolderId),

    // Background results
    DataLoaded(Snapshot),
    Mutated(MutationOutcome),
    Failed { context: &'static str, error: Error },
    StatusClear(u64),

    // Editor handoff
    EditorReady(PreparedEdit),
    EditorFinished { prepared: PreparedEdit, exit: EditorExit },
}

// ============================================================================
// Effects and their payloads
// ============================================================================

#[derive(Debug)]
pub enum Effect {
    Load(LoadRequest),
    Mutate(Mutation),
    /// Fetch the note and write the handoff file.
    PrepareEdit(NoteId),
    /// Release the terminal and block on the editor.
    RunEditor(PreparedEdit),
    Reconcile { prepared: PreparedEdit, exit: EditorExit },
    ClearStatusAfter { generation: u64, delay: Duration },
    Quit,
}

/// Which collections a load should fetch. Omitted ones stay untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Folders plus per-folder counts.
    pub navigation: bool,
    pub templates: bool,
    pub items: Option<ItemRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequest {
    /// Echoed back so results for an abandoned scope can be dropped.
    pub scope: ListScope,
    pub query: ItemQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemQuery {
    List(NoteFilter),
    Search { text: String, filter: NoteFilter },
}

/// Result of a load. Only the collections that were requested are `Some`.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub navigation: Option<NavigationSnapshot>,
    pub templates: Option<Vec<Template>>,
    pub items: Option<ItemSnapshot>,
}

#[derive(Debug, Clone)]
pub struct NavigationSnapshot {
    pub folders: Vec<Folder>,
    pub counts: NoteCounts,
}

#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub scope: ListScope,
    pub notes: Vec<Note>,
    pub snippets: HashMap<NoteId, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateNote {
        title: String,
        is_todo: bool,
        folder: Option<FolderId>,
        /// Folder name used when `folder` is `None`.
        default_folder: Option<String>,
        /// Template name tried before the kind's default template.
        template: Option<String>,
    },
    CreateFolder { name: String, parent: Option<FolderId> },
    DeleteNote(NoteId),
    DeleteFolder(FolderId),
    ToggleStar(NoteId),
    ToggleDone(NoteId),
    CyclePriority(NoteId),
    ToggleFolderStar(FolderId),
}

impl Mutation {
    /// Status-line context when the mutation fails.
    pub fn context(&self) -> &'static str {
        match self {
            Mutation::CreateNote { .. } => "Create failed",
            Mutation::CreateFolder { .. } => "Create folder failed",
            Mutation::DeleteNote(_) => "Delete failed",
            Mutation::DeleteFolder(_) => "Delete folder failed",
            Mutation::ToggleStar(_) | Mutation::ToggleFolderStar(_) => "Star failed",
            Mutation::ToggleDone(_) => "Toggle failed",
            Mutation::CyclePriority(_) => "Priority failed",
        }
    }
}

/// What a finished mutation reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub message: Option<String>,
    /// Set when a folder was deleted, so a scope pointing at it can reset.
    pub removed_folder: Option<FolderId>,
}

impl MutationOutcome {
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            removed_folder: None,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Quit => {
            info!("Quit requested");
            vec![Effect::Quit]
        }

        Action::OpenHelp => {
            if app.overlay == Overlay::None {
                app.overlay = Overlay::Help;
            }
            vec![]
        }
        Action::CloseHelp => {
            if app.overlay == Overlay::Help {
                app.overlay = Overlay::None;
            }
            vec![]
        }

        Action::OpenSearch => {
            if app.overlay == Overlay::None {
                debug!("Entering search");
                app.overlay = Overlay::Search;
            }
            vec![]
        }
        Action::SubmitSearch(text) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return update(app, Action::CancelSearch);
            }
            info!("Searching for '{text}'");
            app.overlay = Overlay::None;
            if !app.scope.is_search() {
                app.base_scope = app.scope.clone();
            }
            app.focus = Panel::Items;
            change_scope(app, ListScope::Search(text))
        }
        Action::CancelSearch => {
            if app.overlay == Overlay::Search {
                app.overlay = Overlay::None;
            }
            if app.scope.is_search() {
                debug!("Leaving search results");
                let base = app.base_scope.clone();
                return change_scope(app, base);
            }
            vec![]
        }

        Action::OpenDialog(kind) => {
            if app.overlay == Overlay::None {
                debug!("Opening dialog: {}", kind.title());
                app.overlay = Overlay::Dialog(kind);
            }
            vec![]
        }
        Action::DialogCancelled => {
            if matches!(app.overlay, Overlay::Dialog(_)) {
                app.overlay = Overlay::None;
            }
            vec![]
        }
        Action::DialogConfirmed(input) => {
            let Overlay::Dialog(kind) = std::mem::take(&mut app.overlay) else {
                return vec![];
            };
            let input = input.trim().to_string();
            let mutation = match kind {
                DialogKind::NewNote { folder } => new_note(app, input, false, folder),
                DialogKind::NewTodo { folder } => new_note(app, input, true, folder),
                DialogKind::NewFolder { parent } => Mutation::CreateFolder {
                    name: input,
                    parent,
                },
                DialogKind::DeleteNote { id, .. } => Mutation::DeleteNote(id),
                DialogKind::DeleteFolder { id, .. } => Mutation::DeleteFolder(id),
            };
            vec![Effect::Mutate(mutation)]
        }

        Action::FocusNext | Action::FocusPrev => {
            app.focus = app.focus.other();
            vec![]
        }
        Action::SelectScope(scope) => {
            if scope == app.scope {
                return vec![];
            }
            app.base_scope = scope.clone();
            change_scope(app, scope)
        }
        Action::ToggleExpanded(id) => {
            if !app.expanded.remove(&id) {
                app.expanded.insert(id);
            }
            app.rebuild_tree();
            vec![]
        }
        Action::TogglePreview => {
            app.preview_visible = !app.preview_visible;
            vec![]
        }
        Action::Refresh => vec![full_load(app)],

        Action::EditNote(id) => {
            if app.overlay != Overlay::None {
                return vec![];
            }
            // Suspended from here on: no second edit and no overlay can
            // start while the handoff file is being prepared.
            info!("Preparing editor for note {id}");
            app.overlay = Overlay::EditorSuspended;
            vec![Effect::PrepareEdit(id)]
        }
        Action::ToggleStar(id) => vec![Effect::Mutate(Mutation::ToggleStar(id))],
        Action::ToggleDone(id) => vec![Effect::Mutate(Mutation::ToggleDone(id))],
        Action::CyclePriority(id) => vec![Effect::Mutate(Mutation::CyclePriority(id))],
        Action::ToggleFolderStar(id) => vec![Effect::Mutate(Mutation::ToggleFolderStar(id))],

        Action::DataLoaded(snapshot) => apply_snapshot(app, snapshot),
        Action::Mutated(outcome) => {
            let mut effects = Vec::new();
            if let Some(removed) = outcome.removed_folder {
                app.expanded.remove(&removed);
                if app.base_scope == ListScope::Folder(removed) {
                    app.base_scope = ListScope::All;
                }
                if app.scope == ListScope::Folder(removed) {
                    app.scope = ListScope::All;
                    app.items_epoch += 1;
                }
            }
            if let Some(message) = outcome.message {
                effects.push(set_status(app, message, StatusKind::Info));
            }
            effects.push(full_load(app));
            effects
        }
        Action::Failed { context, error } => {
            app.loading = false;
            if context == EDIT_FAILED && app.overlay == Overlay::EditorSuspended {
                app.overlay = Overlay::None;
            }
            vec![set_status(app, format!("{context}: {error}"), StatusKind::Error)]
        }
        Action::StatusClear(generation) => {
            if app.status.as_ref().is_some_and(|s| s.generation == generation) {
                app.status = None;
            }
            vec![]
        }

        Action::EditorReady(prepared) => {
            info!("Suspending for editor on note {}", prepared.note_id());
            app.overlay = Overlay::EditorSuspended;
            vec![Effect::RunEditor(prepared)]
        }
        Action::EditorFinished { prepared, exit } => {
            info!("Editor finished for note {}: {:?}", prepared.note_id(), exit);
            if app.overlay == Overlay::EditorSuspended {
                app.overlay = Overlay::None;
            }
            vec![Effect::Reconcile { prepared, exit }]
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn new_note(app: &App, title: String, is_todo: bool, folder: Option<FolderId>) -> Mutation {
    Mutation::CreateNote {
        title,
        is_todo,
        folder,
        default_folder: if folder.is_none() {
            app.settings.default_folder.clone()
        } else {
            None
        },
        template: app.settings.default_template.clone(),
    }
}

/// Switch the item list to `scope`. The old selection is not carried over.
fn change_scope(app: &mut App, scope: ListScope) -> Vec<Effect> {
    debug!("Scope {:?} -> {:?}", app.scope, scope);
    app.scope = scope;
    app.items_epoch += 1;
    app.snippets.clear();
    vec![Effect::Load(LoadRequest {
        navigation: false,
        templates: false,
        items: Some(item_request(app)),
    })]
}

fn item_request(app: &mut App) -> ItemRequest {
    app.loading = true;
    let query = match &app.scope {
        ListScope::Search(text) => ItemQuery::Search {
            text: text.clone(),
            filter: NoteFilter::default(),
        },
        scope => ItemQuery::List(app.filter_for(scope)),
    };
    ItemRequest {
        scope: app.scope.clone(),
        query,
    }
}

/// Reload every collection. Used at startup and after every mutation.
pub fn full_load(app: &mut App) -> Effect {
    Effect::Load(LoadRequest {
        navigation: true,
        templates: true,
        items: Some(item_request(app)),
    })
}

fn set_status(app: &mut App, text: String, kind: StatusKind) -> Effect {
    app.status_generation += 1;
    let generation = app.status_generation;
    app.status = Some(StatusMessage {
        text,
        kind,
        generation,
    });
    let delay = match kind {
        StatusKind::Info => INFO_STATUS_DELAY,
        StatusKind::Error => ERROR_STATUS_DELAY,
    };
    Effect::ClearStatusAfter { generation, delay }
}

fn apply_snapshot(app: &mut App, snapshot: Snapshot) -> Vec<Effect> {
    let mut effects = Vec::new();

    if let Some(nav) = snapshot.navigation {
        debug!("Loaded {} folders", nav.folders.len());
        app.folders = nav.folders;
        app.counts = nav.counts;
        let known: HashSet<FolderId> = app.folders.iter().map(|f| f.id).collect();
        app.expanded.retain(|id| known.contains(id));
        app.rebuild_tree();

        // The folder behind the current scope vanished underneath us.
        if let ListScope::Folder(id) = app.scope
            && !known.contains(&id)
        {
            app.base_scope = ListScope::All;
            effects.extend(change_scope(app, ListScope::All));
        }
    }

    if let Some(templates) = snapshot.templates {
        app.templates = templates;
    }

    if let Some(items) = snapshot.items {
        if items.scope == app.scope {
            debug!("Loaded {} items for {:?}", items.notes.len(), items.scope);
            app.notes = items.notes;
            app.snippets = items.snippets;
            app.loading = effects.iter().any(|e| matches!(e, Effect::Load(_)));
        } else {
            debug!("Discarding items for stale scope {:?}", items.scope);
        }
    }

    effects
}
