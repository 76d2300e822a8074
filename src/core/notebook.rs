//! # Notebook
//!
//! Domain operations over the store. Every mutating call validates first and
//! returns `ValidationFailed` without touching storage; the write itself runs
//! in one transaction, including the search index update.
//!
//! `Notebook` is cheap to clone. Background tasks each take a clone.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::core::error::{Error, Result};
use crate::core::model::{
    Folder, FolderId, NewFolder, NewNote, NewTemplate, Note, NoteFilter, NoteId, Priority,
    Template, TemplateId, TemplateKind,
};
use crate::core::seed;
use crate::core::store::search::SearchHit;
use crate::core::store::{Store, folders, notes, search, templates};
use crate::core::tree::{FolderTree, would_cycle};

/// Outcome of deleting a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderDeletion {
    /// Notes moved to no folder.
    pub notes_unfiled: usize,
    /// Direct subfolders lifted to the deleted folder's parent.
    pub subfolders_moved: usize,
}

/// Per-folder note counts, with the unfiled bucket kept separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCounts {
    pub by_folder: HashMap<FolderId, u64>,
    pub unfiled: u64,
    pub total: u64,
}

#[derive(Clone)]
pub struct Notebook {
    store: Arc<Store>,
}

impl Notebook {
    /// Open the database at `path`, migrating and seeding as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_store(Store::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_store(Store::open_in_memory()?)
    }

    pub fn from_store(store: Store) -> Result<Self> {
        seed::ensure_templates(&store)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Create a note. An empty body is filled from the referenced template.
    pub fn create_note(&self, new: NewNote) -> Result<Note> {
        new.validate()?;
        let note = self.store.write(|tx| {
            let mut new = new;
            if let Some(folder_id) = new.folder_id
                && !folders::exists(tx, folder_id)?
            {
                return Err(Error::not_found("folder", folder_id));
            }
            if let Some(template_id) = new.template_id {
                let template = templates::get(tx, template_id)?;
                if new.body.is_empty() {
                    new.body = template.body;
                }
            }
            notes::insert(tx, &new, Utc::now())
        })?;
        info!("Created note {} ({})", note.id, if note.is_todo { "todo" } else { "note" });
        Ok(note)
    }

    pub fn get_note(&self, id: NoteId) -> Result<Note> {
        self.store.read(|conn| notes::get(conn, id))
    }

    /// Persist every field of `note`. Returns the stored row.
    pub fn update_note(&self, note: Note) -> Result<Note> {
        let mut note = note;
        note.validate()?;
        let saved = self.store.write(|tx| {
            if let Some(folder_id) = note.folder_id
                && !folders::exists(tx, folder_id)?
            {
                return Err(Error::not_found("folder", folder_id));
            }
            notes::update(tx, &note, Utc::now())
        })?;
        info!("Updated note {}", saved.id);
        Ok(saved)
    }

    pub fn delete_note(&self, id: NoteId) -> Result<()> {
        self.store.write(|tx| notes::delete(tx, id))?;
        info!("Deleted note {id}");
        Ok(())
    }

    pub fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        self.store.read(|conn| notes::list(conn, filter))
    }

    pub fn count_notes(&self, filter: &NoteFilter) -> Result<u64> {
        self.store.read(|conn| notes::count(conn, filter))
    }

    pub fn search(&self, query: &str, filter: &NoteFilter) -> Result<Vec<SearchHit>> {
        let hits = self.store.read(|conn| search::search(conn, query, filter))?;
        debug!("Search '{query}' returned {} hits", hits.len());
        Ok(hits)
    }

    pub fn rename_note(&self, id: NoteId, title: &str) -> Result<Note> {
        if title.trim().is_empty() {
            return Err(Error::validation("note title must not be empty"));
        }
        self.modify_note(id, |note| {
            note.title = title.trim().to_string();
            Ok(())
        })
    }

    /// Move a note into `folder`, or out of any folder with `None`.
    pub fn move_note(&self, id: NoteId, folder: Option<FolderId>) -> Result<Note> {
        self.modify_note(id, |note| {
            note.folder_id = folder;
            Ok(())
        })
    }

    pub fn toggle_star(&self, id: NoteId) -> Result<Note> {
        self.modify_note(id, |note| {
            note.starred = !note.starred;
            Ok(())
        })
    }

    /// Flip completion on a todo. Plain notes are rejected.
    pub fn toggle_done(&self, id: NoteId) -> Result<Note> {
        self.modify_note(id, |note| {
            if !note.is_todo {
                return Err(Error::validation(format!("'{}' is not a todo", note.title)));
            }
            note.is_done = !note.is_done;
            Ok(())
        })
    }

    pub fn cycle_priority(&self, id: NoteId) -> Result<Note> {
        self.modify_note(id, |note| {
            note.priority = note.priority.next();
            Ok(())
        })
    }

    pub fn set_priority(&self, id: NoteId, priority: Priority) -> Result<Note> {
        self.modify_note(id, |note| {
            note.priority = priority;
            Ok(())
        })
    }

    /// Read-modify-write inside one transaction.
    fn modify_note(&self, id: NoteId, change: impl FnOnce(&mut Note) -> Result<()>) -> Result<Note> {
        let note = self.store.write(|tx| {
            let mut note = notes::get(tx, id)?;
            change(&mut note)?;
            note.validate()?;
            if let Some(folder_id) = note.folder_id
                && !folders::exists(tx, folder_id)?
            {
                return Err(Error::not_found("folder", folder_id));
            }
            notes::update(tx, &note, Utc::now())
        })?;
        debug!("Modified note {id}");
        Ok(note)
    }

    // ========================================================================
    // Folders
    // ========================================================================

    pub fn create_folder(&self, new: NewFolder) -> Result<Folder> {
        if new.name.trim().is_empty() {
            return Err(Error::validation("folder name must not be empty"));
        }
        let folder = self.store.write(|tx| {
            if let Some(parent) = new.parent_id
                && !folders::exists(tx, parent)?
            {
                return Err(Error::not_found("folder", parent));
            }
            folders::insert(tx, &new, Utc::now())
        })?;
        info!("Created folder {} '{}'", folder.id, folder.name);
        Ok(folder)
    }

    pub fn get_folder(&self, id: FolderId) -> Result<Folder> {
        self.store.read(|conn| folders::get(conn, id))
    }

    pub fn folder_by_name(&self, name: &str) -> Result<Option<Folder>> {
        self.store.read(|conn| folders::find_by_name(conn, name))
    }

    pub fn list_folders(&self) -> Result<Vec<Folder>> {
        self.store.read(folders::list)
    }

    pub fn rename_folder(&self, id: FolderId, name: &str) -> Result<Folder> {
        self.modify_folder(id, |folder| {
            folder.name = name.trim().to_string();
            Ok(())
        })
    }

    /// Re-parent a folder. Moving a folder under itself or a descendant is
    /// rejected.
    pub fn move_folder(&self, id: FolderId, parent: Option<FolderId>) -> Result<Folder> {
        let folder = self.store.write(|tx| {
            let mut folder = folders::get(tx, id)?;
            if let Some(parent) = parent
                && !folders::exists(tx, parent)?
            {
                return Err(Error::not_found("folder", parent));
            }
            if would_cycle(&folders::parent_links(tx)?, id, parent) {
                return Err(Error::validation(format!(
                    "cannot move '{}' inside itself",
                    folder.name
                )));
            }
            folder.parent_id = parent;
            folder.validate()?;
            folders::update(tx, &folder, Utc::now())
        })?;
        info!("Moved folder {id} under {parent:?}");
        Ok(folder)
    }

    pub fn toggle_folder_star(&self, id: FolderId) -> Result<Folder> {
        self.modify_folder(id, |folder| {
            folder.starred = !folder.starred;
            Ok(())
        })
    }

    /// Delete a folder. Its notes become unfiled and its direct subfolders
    /// move up to its own parent, all in one transaction.
    pub fn delete_folder(&self, id: FolderId) -> Result<FolderDeletion> {
        let outcome = self.store.write(|tx| {
            let folder = folders::get(tx, id)?;
            let now = Utc::now();
            let notes_unfiled = notes::clear_folder(tx, id, now)?;
            let subfolders_moved = folders::reparent_children(tx, id, folder.parent_id, now)?;
            folders::delete(tx, id)?;
            Ok(FolderDeletion {
                notes_unfiled,
                subfolders_moved,
            })
        })?;
        info!(
            "Deleted folder {id}: {} notes unfiled, {} subfolders lifted",
            outcome.notes_unfiled, outcome.subfolders_moved
        );
        Ok(outcome)
    }

    pub fn note_counts(&self) -> Result<NoteCounts> {
        let rows = self.store.read(notes::counts_by_folder)?;
        let mut counts = NoteCounts::default();
        for (folder, n) in rows {
            counts.total += n;
            match folder {
                Some(id) => {
                    counts.by_folder.insert(id, n);
                }
                None => counts.unfiled = n,
            }
        }
        Ok(counts)
    }

    /// The derived display tree, with per-folder note counts.
    pub fn folder_tree(&self, expanded: &HashSet<FolderId>) -> Result<FolderTree> {
        let folders = self.list_folders()?;
        let counts = self.note_counts()?;
        Ok(FolderTree::build(&folders, &counts.by_folder, expanded))
    }

    fn modify_folder(
        &self,
        id: FolderId,
        change: impl FnOnce(&mut Folder) -> Result<()>,
    ) -> Result<Folder> {
        self.store.write(|tx| {
            let mut folder = folders::get(tx, id)?;
            change(&mut folder)?;
            folder.validate()?;
            folders::update(tx, &folder, Utc::now())
        })
    }

    // ========================================================================
    // Templates
    // ========================================================================

    pub fn create_template(&self, new: NewTemplate) -> Result<Template> {
        new.validate()?;
        let template = self.store.write(|tx| templates::insert(tx, &new, Utc::now()))?;
        info!("Created template {} '{}'", template.id, template.name);
        Ok(template)
    }

    pub fn get_template(&self, id: TemplateId) -> Result<Template> {
        self.store.read(|conn| templates::get(conn, id))
    }

    pub fn template_by_name(&self, name: &str) -> Result<Option<Template>> {
        self.store.read(|conn| templates::find_by_name(conn, name))
    }

    pub fn default_template(&self, kind: TemplateKind) -> Result<Option<Template>> {
        self.store.read(|conn| templates::default_for(conn, kind))
    }

    pub fn update_template(&self, template: Template) -> Result<Template> {
        let mut template = template;
        template.validate()?;
        self.store.write(|tx| templates::update(tx, &template, Utc::now()))
    }

    /// Notes created from the template keep their content; their
    /// `template_id` is cleared.
    pub fn delete_template(&self, id: TemplateId) -> Result<()> {
        self.store.write(|tx| templates::delete(tx, id))?;
        info!("Deleted template {id}");
        Ok(())
    }

    pub fn list_templates(&self) -> Result<Vec<Template>> {
        self.store.read(templates::list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::FolderScope;

    fn notebook() -> Notebook {
        Notebook::in_memory().unwrap()
    }

    #[test]
    fn test_create_rejects_empty_title_without_writing() {
        let nb = notebook();
        assert!(matches!(
            nb.create_note(NewNote::note("  ")),
            Err(Error::ValidationFailed(_))
        ));
        assert_eq!(nb.count_notes(&NoteFilter::default()).unwrap(), 0);
    }

    #[test]
    fn test_create_in_missing_folder_is_not_found() {
        let nb = notebook();
        assert!(matches!(
            nb.create_note(NewNote::note("x").in_folder(Some(404))),
            Err(Error::NotFound { entity: "folder", id: 404 })
        ));
    }

    #[test]
    fn test_template_body_copied_only_when_body_empty() {
        let nb = notebook();
        let standup = nb.template_by_name("Daily Standup").unwrap().unwrap();

        let mut from_template = NewNote::note("Monday");
        from_template.template_id = Some(standup.id);
        let note = nb.create_note(from_template.clone()).unwrap();
        assert_eq!(note.body, standup.body);
        assert_eq!(note.template_id, Some(standup.id));

        let own = nb.create_note(from_template.with_body("my own")).unwrap();
        assert_eq!(own.body, "my own");
    }

    #[test]
    fn test_toggle_done_rejects_plain_note() {
        let nb = notebook();
        let note = nb.create_note(NewNote::note("plain")).unwrap();
        assert!(matches!(nb.toggle_done(note.id), Err(Error::ValidationFailed(_))));
        let todo = nb.create_note(NewNote::todo("task")).unwrap();
        assert!(nb.toggle_done(todo.id).unwrap().is_done);
    }

    #[test]
    fn test_rename_and_move() {
        let nb = notebook();
        let folder = nb.create_folder(NewFolder::new("Work")).unwrap();
        let note = nb.create_note(NewNote::note("draft")).unwrap();
        let renamed = nb.rename_note(note.id, " final ").unwrap();
        assert_eq!(renamed.title, "final");
        let moved = nb.move_note(note.id, Some(folder.id)).unwrap();
        assert_eq!(moved.folder_id, Some(folder.id));
        assert!(matches!(nb.move_note(note.id, Some(999)), Err(Error::NotFound { .. })));
        assert!(matches!(nb.rename_note(note.id, ""), Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_set_priority() {
        let nb = notebook();
        let todo = nb.create_note(NewNote::todo("t")).unwrap();
        assert_eq!(nb.set_priority(todo.id, Priority::High).unwrap().priority, Priority::High);
    }

    #[test]
    fn test_move_folder_rejects_cycles() {
        let nb = notebook();
        let a = nb.create_folder(NewFolder::new("A")).unwrap();
        let b = nb.create_folder(NewFolder::new("B").under(Some(a.id))).unwrap();
        assert!(matches!(nb.move_folder(a.id, Some(b.id)), Err(Error::ValidationFailed(_))));
        assert!(matches!(nb.move_folder(a.id, Some(a.id)), Err(Error::ValidationFailed(_))));
        let lifted = nb.move_folder(b.id, None).unwrap();
        assert_eq!(lifted.parent_id, None);
    }

    #[test]
    fn test_create_folder_under_missing_parent() {
        let nb = notebook();
        assert!(matches!(
            nb.create_folder(NewFolder::new("child").under(Some(8))),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            nb.create_folder(NewFolder::new("")),
            Err(Error::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_delete_folder_lifts_children_and_unfiles_notes() {
        let nb = notebook();
        let root = nb.create_folder(NewFolder::new("Root")).unwrap();
        let mid = nb.create_folder(NewFolder::new("Mid").under(Some(root.id))).unwrap();
        let leaf = nb.create_folder(NewFolder::new("Leaf").under(Some(mid.id))).unwrap();
        let note = nb.create_note(NewNote::note("inside").in_folder(Some(mid.id))).unwrap();
        let deep = nb.create_note(NewNote::note("deep").in_folder(Some(leaf.id))).unwrap();

        let outcome = nb.delete_folder(mid.id).unwrap();
        assert_eq!(outcome, FolderDeletion { notes_unfiled: 1, subfolders_moved: 1 });
        assert_eq!(nb.get_folder(leaf.id).unwrap().parent_id, Some(root.id));
        assert_eq!(nb.get_note(note.id).unwrap().folder_id, None);
        assert_eq!(nb.get_note(deep.id).unwrap().folder_id, Some(leaf.id));

        let unfiled = NoteFilter {
            folder: FolderScope::Unfiled,
            ..Default::default()
        };
        assert_eq!(nb.list_notes(&unfiled).unwrap().len(), 1);
    }

    #[test]
    fn test_folder_tree_counts() {
        let nb = notebook();
        let work = nb.create_folder(NewFolder::new("Work")).unwrap();
        nb.create_note(NewNote::note("a").in_folder(Some(work.id))).unwrap();
        nb.create_note(NewNote::note("b").in_folder(Some(work.id))).unwrap();
        nb.create_note(NewNote::note("c")).unwrap();
        let tree = nb.folder_tree(&HashSet::new()).unwrap();
        assert_eq!(tree.get(work.id).unwrap().note_count, 2);
        let counts = nb.note_counts().unwrap();
        assert_eq!(counts.unfiled, 1);
        assert_eq!(counts.total, 3);
    }

    #[test]
    fn test_toggle_folder_star_and_rename() {
        let nb = notebook();
        let f = nb.create_folder(NewFolder::new("Work")).unwrap();
        assert!(nb.toggle_folder_star(f.id).unwrap().starred);
        assert_eq!(nb.rename_folder(f.id, "Job").unwrap().name, "Job");
        assert!(matches!(nb.rename_folder(f.id, " "), Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_template_crud() {
        let nb = notebook();
        let seeded = nb.list_templates().unwrap().len();
        let created = nb
            .create_template(NewTemplate {
                name: "Recipe".into(),
                body: "## Ingredients\n".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(nb.list_templates().unwrap().len(), seeded + 1);

        let mut edited = created.clone();
        edited.description = "Cooking".into();
        edited.icon = String::new();
        let saved = nb.update_template(edited).unwrap();
        assert_eq!(saved.description, "Cooking");
        assert_eq!(saved.icon, "📝");

        let note = nb
            .create_note(NewNote {
                template_id: Some(created.id),
                ..NewNote::note("Pancakes")
            })
            .unwrap();
        nb.delete_template(created.id).unwrap();
        let kept = nb.get_note(note.id).unwrap();
        assert_eq!(kept.template_id, None);
        assert_eq!(kept.body, "## Ingredients\n");
        assert!(matches!(nb.get_template(created.id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_defaults_seeded_per_kind() {
        let nb = notebook();
        assert_eq!(
            nb.default_template(TemplateKind::Note).unwrap().map(|t| t.name),
            Some("Blank Note".to_string())
        );
        assert_eq!(
            nb.default_template(TemplateKind::Todo).unwrap().map(|t| t.name),
            Some("Blank Todo".to_string())
        );
    }
}
