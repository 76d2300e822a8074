//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and carries out the
//! `Effect`s the reducer returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop
//!
//! ```text
//!   ┌──────────── draw (only when something changed)
//!   │
//!   ├── poll terminal events ── input::handle_event ── update ──┐
//!   │                                                           │
//!   ├── drain background actions (try_recv) ────────── update ──┤
//!   │                                                           ▼
//!   └──────────────────────────────────────────────── run effects
//!                                                 (spawn tasks, editor, quit)
//! ```
//!
//! ## Editor Handoff
//!
//! `RunEditor` is the one effect handled on the loop's own thread: the
//! terminal is restored, the editor runs in the foreground, and the
//! terminal is re-initialized before `EditorFinished` goes back into the
//! reducer. Nothing else reads the keyboard meanwhile.

mod component;
mod components;
mod event;
mod input;
mod layout;
pub mod markdown;
mod tasks;
mod theme;
mod ui;

use std::collections::VecDeque;
use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::Duration;

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info};

use crate::core::action::{Action, Effect, full_load, update};
use crate::core::config::ResolvedConfig;
use crate::core::editor::{self, EditorCommand};
use crate::core::notebook::Notebook;
use crate::core::state::{App, Overlay};
use crate::tui::components::sidebar::build_rows;
use crate::tui::components::{DialogState, NoteListState, SearchBar, SidebarState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::theme::Palette;

/// Poll interval while a load is in flight, so results show up promptly.
const BUSY_POLL: Duration = Duration::from_millis(30);
/// Poll interval when idle. Background actions are checked at least this
/// often.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub sidebar: SidebarState,
    pub note_list: NoteListState,
    pub search: SearchBar,
    /// Present exactly while the app shows a dialog overlay.
    pub dialog: Option<DialogState>,
    pub palette: Palette,
}

impl TuiState {
    pub fn new(palette: Palette) -> Self {
        Self {
            sidebar: SidebarState::new(),
            note_list: NoteListState::new(),
            search: SearchBar::new(),
            dialog: None,
            palette,
        }
    }

    /// Push the latest `App` snapshot into the component states.
    pub fn sync(&mut self, app: &App) {
        self.sidebar.set_rows(build_rows(&app.tree, &app.counts));
        self.sidebar.select_scope(&app.base_scope);
        self.note_list
            .set_notes(app.notes.clone(), app.snippets.clone(), app.items_epoch);

        match &app.overlay {
            Overlay::Dialog(kind) => {
                if self.dialog.as_ref().is_none_or(|d| d.kind() != kind) {
                    self.dialog = Some(DialogState::new(kind.clone()));
                }
            }
            _ => self.dialog = None,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Enhancement flags are ignored by terminals that lack them.
        execute!(
            stdout(),
            EnableBracketedPaste,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        debug!("Terminal modes enabled (bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Spawns background work for effects. The loop keeps `RunEditor` and
/// `Quit` for itself.
struct Runtime {
    notebook: Notebook,
    editor: EditorCommand,
    tx: mpsc::Sender<Action>,
}

impl Runtime {
    fn spawn(&self, effect: Effect) {
        match effect {
            Effect::Load(request) => tasks::spawn_load(&self.notebook, request, self.tx.clone()),
            Effect::Mutate(mutation) => {
                tasks::spawn_mutation(&self.notebook, mutation, self.tx.clone())
            }
            Effect::PrepareEdit(id) => tasks::spawn_prepare_edit(
                &self.notebook,
                id,
                self.editor.clone(),
                self.tx.clone(),
            ),
            Effect::Reconcile { prepared, exit } => {
                tasks::spawn_reconcile(&self.notebook, prepared, exit, self.tx.clone())
            }
            Effect::ClearStatusAfter { generation, delay } => {
                tasks::spawn_status_clear(generation, delay, self.tx.clone())
            }
            Effect::RunEditor(_) | Effect::Quit => {}
        }
    }
}

pub fn run(config: ResolvedConfig, notebook: Notebook) -> io::Result<()> {
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new(Palette::for_theme(config.theme));

    let (tx, rx) = mpsc::channel();
    let runtime = Runtime {
        notebook,
        editor: config.editor.clone(),
        tx,
    };
    info!("Session starting, editor: {}", runtime.editor.display());

    let mut terminal = ratatui::init();
    let mut mode_guard = Some(TerminalModeGuard::new()?);

    let mut effects: VecDeque<Effect> = VecDeque::from([full_load(&mut app)]);
    let mut needs_redraw = true;

    'session: loop {
        // Effects first: the initial load, or whatever the last pass queued.
        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::Quit => break 'session,
                Effect::RunEditor(prepared) => {
                    drop(mode_guard.take());
                    ratatui::restore();

                    let exit = editor::run(&prepared);

                    terminal = ratatui::init();
                    mode_guard = Some(TerminalModeGuard::new()?);
                    terminal.clear()?;
                    effects.extend(update(&mut app, Action::EditorFinished { prepared, exit }));
                    needs_redraw = true;
                }
                other => runtime.spawn(other),
            }
        }

        if needs_redraw {
            tui.sync(&app);
            terminal.draw(|f| ui::draw(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if app.loading { BUSY_POLL } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout)?;
        let pending = first_event
            .into_iter()
            .chain(std::iter::from_fn(|| poll_event_immediate().ok().flatten()));
        for event in pending {
            needs_redraw = true;
            if matches!(event, TuiEvent::Resize) {
                continue;
            }
            if let Some(action) = input::handle_event(&event, &app, &mut tui) {
                debug!("Key action: {action:?}");
                effects.extend(update(&mut app, action));
                // Component state must see the new app state before the
                // next key is routed.
                tui.sync(&app);
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Background action: {action:?}");
            effects.extend(update(&mut app, action));
        }
    }

    info!("Session ended");
    drop(mode_guard);
    ratatui::restore();
    Ok(())
}
