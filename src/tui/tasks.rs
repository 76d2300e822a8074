//! Background work for effects that touch the store or the filesystem.
//!
//! Each spawned task sends exactly one `Action` back on the channel: the
//! result on success, `Action::Failed` otherwise. SQLite calls block, so they
//! run on tokio's blocking pool and the event loop never waits on the disk.

use std::sync::mpsc;
use std::time::Duration;

use log::{debug, warn};

use crate::core::action::{Action, EDIT_FAILED, LoadRequest, Mutation};
use crate::core::editor::{EditorCommand, EditorExit, PreparedEdit};
use crate::core::error::Error;
use crate::core::model::NoteId;
use crate::core::notebook::Notebook;
use crate::core::session;

/// Run `job` on the blocking pool and send whatever action it produces.
fn spawn_job<F>(tx: mpsc::Sender<Action>, context: &'static str, job: F)
where
    F: FnOnce() -> Action + Send + 'static,
{
    tokio::spawn(async move {
        let action = match tokio::task::spawn_blocking(job).await {
            Ok(action) => action,
            Err(e) => {
                warn!("{context} task panicked: {e}");
                Action::Failed {
                    context,
                    error: Error::validation(format!("background task failed: {e}")),
                }
            }
        };
        if tx.send(action).is_err() {
            warn!("Dropped result of '{context}': receiver gone");
        }
    });
}

pub fn spawn_load(notebook: &Notebook, request: LoadRequest, tx: mpsc::Sender<Action>) {
    let notebook = notebook.clone();
    debug!("Spawning load: {request:?}");
    spawn_job(tx, "Load failed", move || {
        match session::load(&notebook, &request) {
            Ok(snapshot) => Action::DataLoaded(snapshot),
            Err(error) => Action::Failed {
                context: "Load failed",
                error,
            },
        }
    });
}

pub fn spawn_mutation(notebook: &Notebook, mutation: Mutation, tx: mpsc::Sender<Action>) {
    let notebook = notebook.clone();
    let context = mutation.context();
    debug!("Spawning mutation: {mutation:?}");
    spawn_job(tx, context, move || match session::mutate(&notebook, mutation) {
        Ok(outcome) => Action::Mutated(outcome),
        Err(error) => Action::Failed { context, error },
    });
}

pub fn spawn_prepare_edit(
    notebook: &Notebook,
    id: NoteId,
    editor: EditorCommand,
    tx: mpsc::Sender<Action>,
) {
    let notebook = notebook.clone();
    spawn_job(tx, EDIT_FAILED, move || {
        match session::prepare_edit(&notebook, id, &editor) {
            Ok(prepared) => Action::EditorReady(prepared),
            Err(error) => Action::Failed {
                context: EDIT_FAILED,
                error,
            },
        }
    });
}

pub fn spawn_reconcile(
    notebook: &Notebook,
    prepared: PreparedEdit,
    exit: EditorExit,
    tx: mpsc::Sender<Action>,
) {
    let notebook = notebook.clone();
    spawn_job(tx, "Save failed", move || {
        match session::finish_edit(&notebook, prepared, exit) {
            Ok(outcome) => Action::Mutated(outcome),
            Err(error) => Action::Failed {
                context: "Save failed",
                error,
            },
        }
    });
}

/// Send `StatusClear(generation)` once `delay` has passed.
pub fn spawn_status_clear(generation: u64, delay: Duration, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(Action::StatusClear(generation));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{ItemQuery, ItemRequest};
    use crate::core::model::NoteFilter;
    use crate::core::state::ListScope;
    use crate::test_support::test_notebook;

    async fn recv(rx: &mpsc::Receiver<Action>) -> Action {
        for _ in 0..200 {
            if let Ok(action) = rx.try_recv() {
                return action;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no action received");
    }

    #[tokio::test]
    async fn test_mutation_then_load_round_trip() {
        let notebook = test_notebook();
        let (tx, rx) = mpsc::channel();

        spawn_mutation(
            &notebook,
            Mutation::CreateNote {
                title: "Plan".into(),
                is_todo: false,
                folder: None,
                default_folder: None,
                template: None,
            },
            tx.clone(),
        );
        match recv(&rx).await {
            Action::Mutated(outcome) => assert_eq!(outcome.message.as_deref(), Some("Created: Plan")),
            other => panic!("unexpected {other:?}"),
        }

        spawn_load(
            &notebook,
            LoadRequest {
                navigation: true,
                templates: false,
                items: Some(ItemRequest {
                    scope: ListScope::All,
                    query: ItemQuery::List(NoteFilter::default()),
                }),
            },
            tx,
        );
        match recv(&rx).await {
            Action::DataLoaded(snapshot) => {
                let items = snapshot.items.unwrap();
                assert_eq!(items.notes.len(), 1);
                assert_eq!(snapshot.navigation.unwrap().counts.total, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_is_reported_with_context() {
        let notebook = test_notebook();
        let (tx, rx) = mpsc::channel();
        spawn_mutation(&notebook, Mutation::DeleteNote(999), tx);
        match recv(&rx).await {
            Action::Failed { context, error } => {
                assert_eq!(context, Mutation::DeleteNote(999).context());
                assert!(matches!(error, Error::NotFound { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prepare_missing_note_fails() {
        let notebook = test_notebook();
        let (tx, rx) = mpsc::channel();
        spawn_prepare_edit(&notebook, 42, EditorCommand::new("true", Vec::new()), tx);
        assert!(matches!(recv(&rx).await, Action::Failed { context: "Edit failed", .. }));
    }

    #[tokio::test]
    async fn test_status_clear_arrives_after_delay() {
        let (tx, rx) = mpsc::channel();
        spawn_status_clear(7, Duration::from_millis(20), tx);
        assert!(rx.try_recv().is_err());
        assert!(matches!(recv(&rx).await, Action::StatusClear(7)));
    }
}
