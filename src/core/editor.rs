//! # External Editor Handoff
//!
//! Note bodies are edited in the user's own editor, never in-process.
//!
//! ```text
//! prepare()              write "# Title\n\nBody\n" to a fresh temp file
//!    │
//! run()                  blocking; the caller has released the terminal
//!    │
//! reconcile()            re-read, parse, persist, delete the file
//! ```
//!
//! The temp file is owned by a [`HandoffFile`], which deletes it on drop.
//! Every path out of the protocol (success, parse failure, store failure,
//! launch failure) drops the handle, so no file is left behind.
//!
//! ## Buffer format
//!
//! Line 1 is `# ` plus the title, line 2 is blank, the body follows
//! verbatim and the file ends with one extra newline (editors add one when
//! it is missing). Parsing reverses this exactly, so an untouched file
//! reconciles to the same title and body.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::core::model::{Note, NoteId};
use crate::core::notebook::Notebook;

pub const TITLE_MARKER: &str = "# ";

/// Editors tried on `PATH` when nothing is configured.
const FALLBACK_EDITORS: &[&str] = &["nvim", "vim", "vi", "nano"];

// ============================================================================
// Buffer format
// ============================================================================

pub fn format_buffer(title: &str, body: &str) -> String {
    format!("{TITLE_MARKER}{title}\n\n{body}\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBuffer {
    pub title: String,
    pub body: String,
}

/// Parse an edited buffer. Without a title marker on line 1 the original
/// title is kept and the whole text becomes the body.
pub fn parse_buffer(text: &str, original_title: &str) -> ParsedBuffer {
    let (first, rest) = split_line(text);
    let Some(title) = first.strip_prefix(TITLE_MARKER) else {
        return ParsedBuffer {
            title: original_title.to_string(),
            body: text.to_string(),
        };
    };

    let title = match title.trim() {
        "" => original_title.to_string(),
        t => t.to_string(),
    };

    let (separator, after) = split_line(rest);
    let body = if separator.trim().is_empty() { after } else { rest };

    ParsedBuffer {
        title,
        body: strip_one_newline(body).to_string(),
    }
}

/// First line without its terminator, and everything after the terminator.
fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(i) => (text[..i].trim_end_matches('\r'), &text[i + 1..]),
        None => (text, ""),
    }
}

fn strip_one_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

// ============================================================================
// Handoff file
// ============================================================================

/// A temp file that is removed when dropped.
#[derive(Debug)]
pub struct HandoffFile {
    path: PathBuf,
}

impl HandoffFile {
    pub fn create(contents: &str) -> io::Result<Self> {
        Self::create_in(&env::temp_dir(), contents)
    }

    pub fn create_in(dir: &Path, contents: &str) -> io::Result<Self> {
        let path = dir.join(format!("quill-{}.md", uuid::Uuid::new_v4()));
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        // Own the path before writing so a failed write still cleans up.
        let handoff = Self { path };
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(handoff)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

impl Drop for HandoffFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed handoff file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove handoff file {}: {}", self.path.display(), e),
        }
    }
}

// ============================================================================
// Editor command
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EditorCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Configured command, else `$VISUAL`, else `$EDITOR`, else the first
    /// known editor on `PATH`, else `vi`.
    pub fn resolve(configured: Option<&str>, configured_args: &[String]) -> Self {
        if let Some(cmd) = configured.map(str::trim).filter(|c| !c.is_empty()) {
            let mut parsed = Self::parse(cmd).unwrap_or_else(|| Self::new(cmd, Vec::new()));
            parsed.args.extend(configured_args.iter().cloned());
            return parsed;
        }
        for var in ["VISUAL", "EDITOR"] {
            if let Some(parsed) = env::var(var).ok().as_deref().and_then(Self::parse) {
                debug!("Editor from ${var}: {}", parsed.program);
                return parsed;
            }
        }
        FALLBACK_EDITORS
            .iter()
            .find(|name| find_on_path(name).is_some())
            .map(|name| Self::new(*name, Vec::new()))
            .unwrap_or_else(|| Self::new("vi", Vec::new()))
    }

    /// Split a shell-style command line (`code --wait`).
    pub fn parse(line: &str) -> Option<Self> {
        let words = shlex::split(line)
            .unwrap_or_else(|| line.split_whitespace().map(String::from).collect());
        let mut words = words.into_iter();
        let program = words.next().filter(|p| !p.is_empty())?;
        Some(Self::new(program, words.collect()))
    }

    pub fn command_for(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(path);
        cmd
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// Protocol
// ============================================================================

/// Everything needed to run the editor, built before the terminal is
/// released.
#[derive(Debug)]
pub struct PreparedEdit {
    /// Snapshot taken at prepare time. Its title is the fallback when the
    /// edited file has no title line.
    pub note: Note,
    pub file: HandoffFile,
    pub editor: EditorCommand,
}

impl PreparedEdit {
    pub fn note_id(&self) -> NoteId {
        self.note.id
    }

    pub fn command(&self) -> Command {
        self.editor.command_for(self.file.path())
    }
}

/// How the editor process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorExit {
    Success,
    /// Ran but exited non-zero. The file may still hold saved work.
    Failed(String),
    /// Never started.
    LaunchFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub note: Note,
    pub changed: bool,
    /// Set when the editor exited non-zero but the edit was still applied.
    pub warning: Option<String>,
}

pub fn prepare(note: Note, editor: &EditorCommand) -> Result<PreparedEdit> {
    let buffer = format_buffer(&note.title, &note.body);
    let file = HandoffFile::create(&buffer)
        .map_err(|e| Error::editor(format!("could not create temp file: {e}")))?;
    debug!("Prepared note {} at {}", note.id, file.path().display());
    Ok(PreparedEdit {
        note,
        file,
        editor: editor.clone(),
    })
}

/// Run the editor and wait for it. The caller owns the terminal handoff.
pub fn run(prepared: &PreparedEdit) -> EditorExit {
    info!("Launching editor: {} {}", prepared.editor.display(), prepared.file.path().display());
    match prepared.command().status() {
        Ok(status) if status.success() => EditorExit::Success,
        Ok(status) => {
            warn!("Editor exited with {status}");
            EditorExit::Failed(format!("editor exited with {status}"))
        }
        Err(e) => {
            warn!("Could not launch editor '{}': {}", prepared.editor.program, e);
            EditorExit::LaunchFailed(format!("could not launch '{}': {e}", prepared.editor.program))
        }
    }
}

/// Read the edited file back and persist it. Consumes `prepared`, so the
/// handoff file is gone when this returns, whatever the outcome.
pub fn reconcile(notebook: &Notebook, prepared: PreparedEdit, exit: EditorExit) -> Result<Reconciled> {
    let PreparedEdit { note: snapshot, file, .. } = prepared;

    let warning = match exit {
        EditorExit::Success => None,
        EditorExit::Failed(msg) => Some(msg),
        EditorExit::LaunchFailed(msg) => return Err(Error::editor(msg)),
    };

    let text = file
        .read()
        .map_err(|e| Error::editor(format!("could not read edited note: {e}")))?;
    drop(file);

    let parsed = parse_buffer(&text, &snapshot.title);
    let mut current = notebook.get_note(snapshot.id)?;
    // An untouched file must not write back over changes saved since prepare.
    if parsed.title == snapshot.title && parsed.body == snapshot.body {
        debug!("Note {} unchanged after edit", snapshot.id);
        return Ok(Reconciled {
            note: current,
            changed: false,
            warning,
        });
    }

    current.title = parsed.title;
    current.body = parsed.body;
    let saved = notebook.update_note(current)?;
    info!("Reconciled edit of note {}", saved.id);
    Ok(Reconciled {
        note: saved,
        changed: true,
        warning,
    })
}

/// The whole protocol in the foreground, for the command line. The
/// terminal is not in raw mode there, so no handoff is needed.
pub fn edit_note(notebook: &Notebook, id: NoteId, editor: &EditorCommand) -> Result<Reconciled> {
    let note = notebook.get_note(id)?;
    let prepared = prepare(note, editor)?;
    let exit = run(&prepared);
    reconcile(notebook, prepared, exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::NewNote;

    #[test]
    fn test_round_trip_unmodified() {
        for (title, body) in [
            ("T", "B"),
            ("T", ""),
            ("T", "B\n"),
            ("Plan", "line 1\n\nline 3\n\n"),
            ("Hash", "# not a title\nbody"),
        ] {
            let parsed = parse_buffer(&format_buffer(title, body), "fallback");
            assert_eq!(parsed.title, title);
            assert_eq!(parsed.body, body, "body {body:?}");
        }
    }

    #[test]
    fn test_missing_marker_keeps_title_and_whole_body() {
        let parsed = parse_buffer("Just text\n\nmore\n", "Original");
        assert_eq!(parsed.title, "Original");
        assert_eq!(parsed.body, "Just text\n\nmore\n");

        let heading = parse_buffer("## Sub\nbody", "Original");
        assert_eq!(heading.title, "Original");
        assert_eq!(heading.body, "## Sub\nbody");
    }

    #[test]
    fn test_blank_title_keeps_original() {
        let parsed = parse_buffer("#   \n\nbody\n", "Original");
        assert_eq!(parsed.title, "Original");
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_missing_separator_line_is_tolerated() {
        let parsed = parse_buffer("# New\nbody right away\n", "Old");
        assert_eq!(parsed.title, "New");
        assert_eq!(parsed.body, "body right away");
    }

    #[test]
    fn test_crlf_buffers() {
        let parsed = parse_buffer("# Win\r\n\r\nbody\r\n", "Old");
        assert_eq!(parsed.title, "Win");
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_handoff_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let file = HandoffFile::create_in(dir.path(), "hello").unwrap();
            assert_eq!(file.read().unwrap(), "hello");
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_editor_command() {
        let cmd = EditorCommand::parse("code --wait").unwrap();
        assert_eq!(cmd.program, "code");
        assert_eq!(cmd.args, vec!["--wait"]);
        let quoted = EditorCommand::parse("'/opt/my editor/bin/ed' -n").unwrap();
        assert_eq!(quoted.program, "/opt/my editor/bin/ed");
        assert!(EditorCommand::parse("   ").is_none());
    }

    #[test]
    fn test_configured_editor_wins() {
        let cmd = EditorCommand::resolve(Some("hx"), &["--vsplit".to_string()]);
        assert_eq!(cmd, EditorCommand::new("hx", vec!["--vsplit".to_string()]));
    }

    #[test]
    fn test_reconcile_launch_failure_removes_file() {
        let nb = Notebook::in_memory().unwrap();
        let note = nb.create_note(NewNote::note("T").with_body("B")).unwrap();
        let prepared = prepare(note, &EditorCommand::new("quill-no-such-editor", vec![])).unwrap();
        let path = prepared.file.path().to_path_buf();
        let exit = run(&prepared);
        assert!(matches!(exit, EditorExit::LaunchFailed(_)));
        assert!(matches!(reconcile(&nb, prepared, exit), Err(Error::EditorFailure(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_reconcile_applies_edit_despite_failed_exit() {
        let nb = Notebook::in_memory().unwrap();
        let note = nb.create_note(NewNote::note("T").with_body("B")).unwrap();
        let prepared = prepare(note.clone(), &EditorCommand::new("true", vec![])).unwrap();
        fs::write(prepared.file.path(), "# T2\n\nB2\n").unwrap();
        let path = prepared.file.path().to_path_buf();

        let done = reconcile(&nb, prepared, EditorExit::Failed("exit 1".into())).unwrap();
        assert!(done.changed);
        assert_eq!(done.warning.as_deref(), Some("exit 1"));
        assert_eq!(nb.get_note(note.id).unwrap().title, "T2");
        assert_eq!(nb.get_note(note.id).unwrap().body, "B2");
        assert!(!path.exists());
    }

    #[test]
    fn test_untouched_later_session_keeps_earlier_save() {
        let nb = Notebook::in_memory().unwrap();
        let note = nb.create_note(NewNote::note("T").with_body("original")).unwrap();
        let editor = EditorCommand::new("true", vec![]);
        let first = prepare(nb.get_note(note.id).unwrap(), &editor).unwrap();
        let second = prepare(nb.get_note(note.id).unwrap(), &editor).unwrap();

        fs::write(first.file.path(), "# T\n\nuser edit\n").unwrap();
        assert!(reconcile(&nb, first, EditorExit::Success).unwrap().changed);

        let done = reconcile(&nb, second, EditorExit::Success).unwrap();
        assert!(!done.changed);
        assert_eq!(done.note.body, "user edit");
        assert_eq!(nb.get_note(note.id).unwrap().body, "user edit");
    }

    #[test]
    fn test_reconcile_store_failure_still_removes_file() {
        let nb = Notebook::in_memory().unwrap();
        let note = nb.create_note(NewNote::note("T")).unwrap();
        let prepared = prepare(note.clone(), &EditorCommand::new("true", vec![])).unwrap();
        let path = prepared.file.path().to_path_buf();
        nb.delete_note(note.id).unwrap();
        assert!(matches!(
            reconcile(&nb, prepared, EditorExit::Success),
            Err(Error::NotFound { .. })
        ));
        assert!(!path.exists());
    }
}
