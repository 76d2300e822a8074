//! # Session Work
//!
//! The blocking halves of the effects `update()` returns. Each function runs
//! on a worker thread against a `Notebook` clone and produces the payload of
//! exactly one result action.
//!
//! ```text
//! Effect::Load(req)        → load()         → Action::DataLoaded
//! Effect::Mutate(m)        → mutate()       → Action::Mutated
//! Effect::PrepareEdit(id)  → prepare_edit() → Action::EditorReady
//! Effect::Reconcile{..}    → finish_edit()  → Action::Mutated
//! ```
//!
//! Any `Err` becomes `Action::Failed` in the adapter.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::core::action::{
    ItemQuery, ItemSnapshot, LoadRequest, Mutation, MutationOutcome, NavigationSnapshot, Snapshot,
};
use crate::core::editor::{self, EditorCommand, EditorExit, PreparedEdit};
use crate::core::error::Result;
use crate::core::model::{FolderId, NewFolder, NewNote, NoteId, TemplateKind};
use crate::core::notebook::Notebook;

/// Fetch the collections `request` asks for.
pub fn load(notebook: &Notebook, request: &LoadRequest) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();

    if request.navigation {
        snapshot.navigation = Some(NavigationSnapshot {
            folders: notebook.list_folders()?,
            counts: notebook.note_counts()?,
        });
    }
    if request.templates {
        snapshot.templates = Some(notebook.list_templates()?);
    }
    if let Some(items) = &request.items {
        let (notes, snippets) = match &items.query {
            ItemQuery::List(filter) => (notebook.list_notes(filter)?, HashMap::new()),
            ItemQuery::Search { text, filter } => {
                let hits = notebook.search(text, filter)?;
                let snippets = hits
                    .iter()
                    .map(|hit| (hit.note.id, hit.snippet.clone()))
                    .collect();
                (hits.into_iter().map(|hit| hit.note).collect(), snippets)
            }
        };
        snapshot.items = Some(ItemSnapshot {
            scope: items.scope.clone(),
            notes,
            snippets,
        });
    }

    Ok(snapshot)
}

pub fn mutate(notebook: &Notebook, mutation: Mutation) -> Result<MutationOutcome> {
    debug!("Applying {:?}", mutation);
    match mutation {
        Mutation::CreateNote {
            title,
            is_todo,
            folder,
            default_folder,
            template,
        } => {
            let folder = match folder {
                Some(id) => Some(id),
                None => resolve_default_folder(notebook, default_folder.as_deref())?,
            };
            let kind = if is_todo { TemplateKind::Todo } else { TemplateKind::Note };
            let mut new = if is_todo {
                NewNote::todo(title)
            } else {
                NewNote::note(title)
            }
            .in_folder(folder);
            new.template_id = resolve_template(notebook, kind, template.as_deref())?;

            let note = notebook.create_note(new)?;
            Ok(MutationOutcome::with_message(format!("Created: {}", note.title)))
        }
        Mutation::CreateFolder { name, parent } => {
            let folder = notebook.create_folder(NewFolder::new(name).under(parent))?;
            Ok(MutationOutcome::with_message(format!("Created folder: {}", folder.name)))
        }
        Mutation::DeleteNote(id) => {
            notebook.delete_note(id)?;
            Ok(MutationOutcome::with_message("Note deleted"))
        }
        Mutation::DeleteFolder(id) => {
            let deletion = notebook.delete_folder(id)?;
            let message = match deletion.notes_unfiled {
                0 => "Folder deleted".to_string(),
                1 => "Folder deleted, 1 note moved to Inbox".to_string(),
                n => format!("Folder deleted, {n} notes moved to Inbox"),
            };
            Ok(MutationOutcome {
                message: Some(message),
                removed_folder: Some(id),
            })
        }
        Mutation::ToggleStar(id) => {
            notebook.toggle_star(id)?;
            Ok(MutationOutcome::quiet())
        }
        Mutation::ToggleDone(id) => {
            notebook.toggle_done(id)?;
            Ok(MutationOutcome::quiet())
        }
        Mutation::CyclePriority(id) => {
            let note = notebook.cycle_priority(id)?;
            Ok(MutationOutcome::with_message(format!(
                "Priority: {}",
                note.priority.label()
            )))
        }
        Mutation::ToggleFolderStar(id) => {
            notebook.toggle_folder_star(id)?;
            Ok(MutationOutcome::quiet())
        }
    }
}

fn resolve_default_folder(notebook: &Notebook, name: Option<&str>) -> Result<Option<FolderId>> {
    let Some(name) = name else {
        return Ok(None);
    };
    match notebook.folder_by_name(name)? {
        Some(folder) => Ok(Some(folder.id)),
        None => {
            warn!("Default folder '{name}' does not exist, creating note in Inbox");
            Ok(None)
        }
    }
}

/// The named template if it exists and matches `kind`, else the kind's
/// default template.
fn resolve_template(
    notebook: &Notebook,
    kind: TemplateKind,
    name: Option<&str>,
) -> Result<Option<i64>> {
    if let Some(name) = name {
        match notebook.template_by_name(name)? {
            Some(template) if template.kind == kind => return Ok(Some(template.id)),
            Some(_) => debug!("Template '{name}' is not a {} template", kind.as_str()),
            None => warn!("Default template '{name}' does not exist"),
        }
    }
    Ok(notebook.default_template(kind)?.map(|t| t.id))
}

/// Fetch the note and write its handoff file.
pub fn prepare_edit(notebook: &Notebook, id: NoteId, editor: &EditorCommand) -> Result<PreparedEdit> {
    let note = notebook.get_note(id)?;
    editor::prepare(note, editor)
}

/// Reconcile an editor session and describe the result for the status line.
pub fn finish_edit(
    notebook: &Notebook,
    prepared: PreparedEdit,
    exit: EditorExit,
) -> Result<MutationOutcome> {
    let reconciled = editor::reconcile(notebook, prepared, exit)?;
    let mut message = if reconciled.changed {
        "Note saved".to_string()
    } else {
        "No changes".to_string()
    };
    if let Some(warning) = reconciled.warning {
        message = format!("{message} ({warning})");
    }
    info!("Edit of note {} finished: {message}", reconciled.note.id);
    Ok(MutationOutcome::with_message(message))
}
