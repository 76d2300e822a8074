use std::collections::VecDeque;

use quill::core::action::{Action, Effect, full_load, update};
use quill::core::editor::{self, EditorCommand, EditorExit};
use quill::core::model::{FolderScope, NewFolder, NewNote, NoteFilter, Priority};
use quill::core::session;
use quill::core::state::{App, DialogKind, ListScope, Overlay, Settings};
use quill::{Error, Notebook};

// ============================================================================
// Helper Functions
// ============================================================================

/// A notebook backed by a real file in a temp directory.
fn file_notebook() -> (tempfile::TempDir, Notebook) {
    let dir = tempfile::tempdir().unwrap();
    let notebook = Notebook::open(dir.path().join("quill.db")).unwrap();
    (dir, notebook)
}

/// Apply `action` and run every resulting effect synchronously, feeding
/// results back in, the way the event loop would. Editor effects are not
/// expected here.
fn drive(app: &mut App, notebook: &Notebook, action: Action) {
    let mut queue: VecDeque<Effect> = update(app, action).into();
    while let Some(effect) = queue.pop_front() {
        let next = match effect {
            Effect::Load(request) => match session::load(notebook, &request) {
                Ok(snapshot) => Action::DataLoaded(snapshot),
                Err(error) => Action::Failed { context: "Load failed", error },
            },
            Effect::Mutate(mutation) => {
                let context = mutation.context();
                match session::mutate(notebook, mutation) {
                    Ok(outcome) => Action::Mutated(outcome),
                    Err(error) => Action::Failed { context, error },
                }
            }
            Effect::ClearStatusAfter { .. } | Effect::Quit => continue,
            other => panic!("unexpected effect {other:?}"),
        };
        queue.extend(update(app, next));
    }
}

fn started(notebook: &Notebook) -> App {
    let mut app = App::new(Settings::default(), true);
    let effect = full_load(&mut app);
    let Effect::Load(request) = effect else {
        panic!("initial effect must be a load");
    };
    let snapshot = session::load(notebook, &request).unwrap();
    update(&mut app, Action::DataLoaded(snapshot));
    app
}

fn titles(app: &App) -> Vec<String> {
    app.notes.iter().map(|n| n.title.clone()).collect()
}

// ============================================================================
// Domain + Persistence
// ============================================================================

#[test]
fn test_create_then_get_round_trips_fields() {
    let (_dir, notebook) = file_notebook();
    let mut new = NewNote::todo("Ship release")
        .with_body("checklist")
        .with_tags("work, q1");
    new.priority = Priority::Medium;
    let created = notebook.create_note(new).unwrap();

    let fetched = notebook.get_note(created.id).unwrap();
    assert_eq!(fetched.title, "Ship release");
    assert_eq!(fetched.body, "checklist");
    assert_eq!(fetched.tags, "work, q1");
    assert!(fetched.is_todo);
    assert!(!fetched.is_done);
    assert_eq!(fetched.priority, Priority::Medium);
    assert!(fetched.id > 0);
    assert_eq!(fetched.created_at, created.created_at);
}

#[test]
fn test_empty_title_rejected_before_store() {
    let (_dir, notebook) = file_notebook();
    let err = notebook.create_note(NewNote::note("   ")).unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));
    assert_eq!(notebook.count_notes(&NoteFilter::default()).unwrap(), 0);
}

#[test]
fn test_multiline_title_rejected_so_handoff_round_trips() {
    let (_dir, notebook) = file_notebook();
    let err = notebook
        .create_note(NewNote::note("line one\nline two").with_body("B"))
        .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));

    let note = notebook.create_note(NewNote::note("line one").with_body("B")).unwrap();
    assert!(matches!(
        notebook.rename_note(note.id, "line one\r\nline two"),
        Err(Error::ValidationFailed(_))
    ));
    assert_eq!(notebook.get_note(note.id).unwrap().title, "line one");
}

#[test]
fn test_delete_removes_from_list_and_search() {
    let (_dir, notebook) = file_notebook();
    let note = notebook
        .create_note(NewNote::note("Quarterly planning").with_body("budget forecast"))
        .unwrap();
    assert_eq!(notebook.search("forecast", &NoteFilter::default()).unwrap().len(), 1);

    notebook.delete_note(note.id).unwrap();
    assert!(notebook.list_notes(&NoteFilter::default()).unwrap().is_empty());
    for term in ["forecast", "budget", "Quarterly"] {
        assert!(notebook.search(term, &NoteFilter::default()).unwrap().is_empty());
    }
    assert!(matches!(
        notebook.get_note(note.id),
        Err(Error::NotFound { entity: "note", .. })
    ));
}

#[test]
fn test_toggles_are_involutions_and_priority_cycles() {
    let (_dir, notebook) = file_notebook();
    let todo = notebook.create_note(NewNote::todo("Water plants")).unwrap();

    notebook.toggle_star(todo.id).unwrap();
    assert!(!notebook.toggle_star(todo.id).unwrap().starred);

    notebook.toggle_done(todo.id).unwrap();
    assert!(!notebook.toggle_done(todo.id).unwrap().is_done);

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(notebook.cycle_priority(todo.id).unwrap().priority);
    }
    assert_eq!(
        seen,
        vec![Priority::Low, Priority::Medium, Priority::High, Priority::None]
    );
}

#[test]
fn test_scenario_folder_filter_tag_search_and_delete_policy() {
    let (_dir, notebook) = file_notebook();
    let work = notebook.create_folder(NewFolder::new("Work")).unwrap();
    let team = notebook
        .create_folder(NewFolder::new("Team").under(Some(work.id)))
        .unwrap();
    notebook
        .create_note(NewNote::note("Standup").in_folder(Some(work.id)).with_tags("daily"))
        .unwrap();
    notebook.create_note(NewNote::note("Groceries")).unwrap();

    let in_work = notebook.list_notes(&NoteFilter::in_folder(work.id)).unwrap();
    assert_eq!(in_work.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(), vec!["Standup"]);

    // "daily" only appears in the tag field.
    let hits = notebook.search("daily", &NoteFilter::default()).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].note.title, "Standup");

    let deletion = notebook.delete_folder(work.id).unwrap();
    assert_eq!(deletion.notes_unfiled, 1);
    assert_eq!(deletion.subfolders_moved, 1);

    let unfiled = notebook
        .list_notes(&NoteFilter {
            folder: FolderScope::Unfiled,
            ..Default::default()
        })
        .unwrap();
    assert!(unfiled.iter().any(|n| n.title == "Standup"));
    assert_eq!(notebook.get_folder(team.id).unwrap().parent_id, None);
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quill.db");
    let seeded = {
        let notebook = Notebook::open(&path).unwrap();
        notebook.create_note(NewNote::note("Persisted")).unwrap();
        notebook.list_templates().unwrap().len()
    };
    let notebook = Notebook::open(&path).unwrap();
    let notes = notebook.list_notes(&NoteFilter::default()).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notebook.search("persisted", &NoteFilter::default()).unwrap().len(), 1);
    // Templates are seeded once, not on every open.
    assert!(seeded > 0);
    assert_eq!(notebook.list_templates().unwrap().len(), seeded);
}

#[test]
fn test_folder_cannot_move_under_its_descendant() {
    let (_dir, notebook) = file_notebook();
    let work = notebook.create_folder(NewFolder::new("Work")).unwrap();
    let team = notebook
        .create_folder(NewFolder::new("Team").under(Some(work.id)))
        .unwrap();

    let err = notebook.move_folder(work.id, Some(team.id)).unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));
    assert!(matches!(
        notebook.move_folder(work.id, Some(work.id)),
        Err(Error::ValidationFailed(_))
    ));
    assert_eq!(notebook.get_folder(work.id).unwrap().parent_id, None);

    let moved = notebook.move_folder(team.id, None).unwrap();
    assert_eq!(moved.parent_id, None);
}

// ============================================================================
// Editor Protocol
// ============================================================================

#[cfg(unix)]
#[test]
fn test_unmodified_handoff_keeps_note_exactly() {
    let (_dir, notebook) = file_notebook();
    let note = notebook
        .create_note(NewNote::note("T").with_body("B"))
        .unwrap();

    // `true` exits successfully without touching the file.
    let reconciled =
        editor::edit_note(&notebook, note.id, &EditorCommand::new("true", Vec::new())).unwrap();
    assert!(!reconciled.changed);
    assert_eq!(reconciled.note.title, "T");
    assert_eq!(reconciled.note.body, "B");
}

#[cfg(unix)]
#[test]
fn test_malformed_first_line_keeps_title() {
    let (_dir, notebook) = file_notebook();
    let note = notebook.create_note(NewNote::note("Original")).unwrap();

    // The file path arrives as $0.
    let overwrite = EditorCommand::new(
        "sh",
        vec!["-c".into(), "printf 'no marker here\\nsecond line\\n' > \"$0\"".into()],
    );
    let reconciled = editor::edit_note(&notebook, note.id, &overwrite).unwrap();
    assert!(reconciled.changed);
    assert_eq!(reconciled.note.title, "Original");
    assert_eq!(reconciled.note.body, "no marker here\nsecond line\n");
}

#[cfg(unix)]
#[test]
fn test_failing_editor_still_applies_edit() {
    let (_dir, notebook) = file_notebook();
    let note = notebook.create_note(NewNote::note("Draft")).unwrap();
    let save_then_fail = EditorCommand::new(
        "sh",
        vec!["-c".into(), "printf '# Final\\n\\nbody\\n' > \"$0\"; exit 3".into()],
    );
    let reconciled = editor::edit_note(&notebook, note.id, &save_then_fail).unwrap();
    assert_eq!(reconciled.note.title, "Final");
    assert_eq!(reconciled.note.body, "body");
    assert!(reconciled.warning.is_some());
}

#[test]
fn test_launch_failure_leaves_no_temp_file() {
    let (_dir, notebook) = file_notebook();
    let note = notebook.create_note(NewNote::note("Keep")).unwrap();
    let missing = EditorCommand::new("quill-no-such-editor-binary", Vec::new());

    let prepared = editor::prepare(notebook.get_note(note.id).unwrap(), &missing).unwrap();
    let path = prepared.file.path().to_path_buf();
    assert!(path.exists());

    let exit = editor::run(&prepared);
    assert!(matches!(exit, EditorExit::LaunchFailed(_)));
    let err = editor::reconcile(&notebook, prepared, exit).unwrap_err();
    assert!(matches!(err, Error::EditorFailure(_)));
    assert!(!path.exists());
    assert_eq!(notebook.get_note(note.id).unwrap().title, "Keep");
}

// ============================================================================
// Session Engine
// ============================================================================

#[test]
fn test_session_create_folder_and_note_through_dialogs() {
    let (_dir, notebook) = file_notebook();
    let mut app = started(&notebook);

    drive(&mut app, &notebook, Action::OpenDialog(DialogKind::NewFolder { parent: None }));
    drive(&mut app, &notebook, Action::DialogConfirmed("Work".into()));
    assert_eq!(app.overlay, Overlay::None);
    let work = app.folders.iter().find(|f| f.name == "Work").unwrap().id;

    drive(&mut app, &notebook, Action::SelectScope(ListScope::Folder(work)));
    drive(
        &mut app,
        &notebook,
        Action::OpenDialog(DialogKind::NewNote { folder: Some(work) }),
    );
    drive(&mut app, &notebook, Action::DialogConfirmed("Standup".into()));

    assert_eq!(titles(&app), vec!["Standup"]);
    assert_eq!(app.counts.by_folder.get(&work), Some(&1));
    assert_eq!(app.status.as_ref().unwrap().text, "Created: Standup");
}

#[test]
fn test_session_blank_title_reports_error_and_continues() {
    let (_dir, notebook) = file_notebook();
    let mut app = started(&notebook);

    drive(&mut app, &notebook, Action::OpenDialog(DialogKind::NewNote { folder: None }));
    drive(&mut app, &notebook, Action::DialogConfirmed("  ".into()));

    let status = app.status.as_ref().unwrap();
    assert!(status.text.starts_with("Create failed"), "{}", status.text);
    assert_eq!(app.overlay, Overlay::None);
    assert!(app.notes.is_empty());
}

#[test]
fn test_session_search_then_escape_restores_scope() {
    let (_dir, notebook) = file_notebook();
    notebook
        .create_note(NewNote::note("Standup").with_tags("daily"))
        .unwrap();
    notebook.create_note(NewNote::note("Groceries")).unwrap();
    let mut app = started(&notebook);
    assert_eq!(app.notes.len(), 2);

    drive(&mut app, &notebook, Action::OpenSearch);
    drive(&mut app, &notebook, Action::SubmitSearch("daily".into()));
    assert_eq!(app.scope, ListScope::Search("daily".into()));
    assert_eq!(titles(&app), vec!["Standup"]);
    assert!(app.snippets.values().next().is_some());

    drive(&mut app, &notebook, Action::CancelSearch);
    assert_eq!(app.scope, ListScope::All);
    assert_eq!(app.notes.len(), 2);
}

#[test]
fn test_session_deleting_selected_folder_falls_back() {
    let (_dir, notebook) = file_notebook();
    let work = notebook.create_folder(NewFolder::new("Work")).unwrap();
    notebook
        .create_note(NewNote::note("Standup").in_folder(Some(work.id)))
        .unwrap();
    let mut app = started(&notebook);

    drive(&mut app, &notebook, Action::SelectScope(ListScope::Folder(work.id)));
    drive(
        &mut app,
        &notebook,
        Action::OpenDialog(DialogKind::DeleteFolder {
            id: work.id,
            name: "Work".into(),
        }),
    );
    drive(&mut app, &notebook, Action::DialogConfirmed(String::new()));

    assert_eq!(app.scope, ListScope::All);
    assert!(app.folders.is_empty());
    assert_eq!(app.counts.unfiled, 1);
    assert_eq!(
        app.status.as_ref().unwrap().text,
        "Folder deleted, 1 note moved to Inbox"
    );
}
