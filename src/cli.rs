//! Command-line surface. With no subcommand the binary opens the interactive
//! session; each subcommand runs one domain operation and prints the result.

use std::collections::HashSet;
use std::error::Error as StdError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use quill::core::config::{self, ResolvedConfig};
use quill::core::editor;
use quill::core::model::{
    FolderId, FolderScope, NewFolder, NewNote, Note, NoteFilter, Priority, TemplateKind,
};
use quill::{Error, Notebook};

pub type CliResult = std::result::Result<(), Box<dyn StdError>>;

const SNIPPET_WIDTH: usize = 72;

#[derive(Parser)]
#[command(name = "quill", version, about = "Notes and todos in the terminal")]
pub struct Args {
    /// Config file (default: <config_dir>/quill/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config file and QUILL_DB
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a note
    Add {
        title: String,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        template: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Create a todo
    Todo {
        title: String,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        folder: Option<String>,
    },
    /// List notes, most recently updated first
    List {
        #[arg(long)]
        todos: bool,
        #[arg(long)]
        starred: bool,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Full-text search over titles, bodies and tags
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Open a note in the external editor
    Edit { id: i64 },
    /// List templates
    Templates,
    /// Show the folder tree with note counts
    Folders,
    /// Create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete a folder; its notes move to the Inbox
    Rmdir { name: String },
    /// Move a note to a folder, or to the Inbox without --folder
    Mv {
        id: i64,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Inspect or clear the log file
    Logs {
        #[command(subcommand)]
        action: LogsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// Print where the log file lives and its size
    Path,
    /// Print the log file
    Show {
        /// Only the last N lines
        #[arg(long, short = 'n')]
        lines: Option<usize>,
    },
    /// Empty the log file
    Clear,
}

pub fn execute(
    command: Command,
    notebook: &Notebook,
    config: &ResolvedConfig,
    out: &mut impl Write,
) -> CliResult {
    match command {
        Command::Add {
            title,
            folder,
            template,
            tags,
        } => {
            let folder = folder_id(notebook, folder.as_deref())?;
            let mut new = NewNote::note(title)
                .in_folder(folder)
                .with_tags(tags.unwrap_or_default());
            new.template_id = template_id(notebook, TemplateKind::Note, template.as_deref())?;
            let note = notebook.create_note(new)?;
            writeln!(out, "Created note #{}: {}", note.id, note.title)?;
        }
        Command::Todo {
            title,
            priority,
            due,
            folder,
        } => {
            let folder = folder_id(notebook, folder.as_deref())?;
            let mut new = NewNote::todo(title).in_folder(folder);
            new.priority = priority.map(Priority::from).unwrap_or_default();
            new.due_at = due.map(|d| d.and_time(NaiveTime::MIN).and_utc());
            new.template_id = template_id(notebook, TemplateKind::Todo, None)?;
            let note = notebook.create_note(new)?;
            writeln!(out, "Created todo #{}: {}", note.id, note.title)?;
        }
        Command::List {
            todos,
            starred,
            folder,
            limit,
        } => {
            let mut filter = if todos {
                NoteFilter::todos().sorted_by(config.todo_sort)
            } else {
                NoteFilter::default()
            };
            if todos && !config.show_completed {
                filter.is_done = Some(false);
            }
            if starred {
                filter.starred = Some(true);
            }
            if let Some(id) = folder_id(notebook, folder.as_deref())? {
                filter.folder = FolderScope::In(id);
            }
            filter.limit = limit;
            let notes = notebook.list_notes(&filter)?;
            if notes.is_empty() {
                writeln!(out, "No notes.")?;
            }
            for note in &notes {
                writeln!(out, "{}", note_row(note))?;
            }
        }
        Command::Search { query, limit } => {
            let filter = NoteFilter {
                limit,
                ..Default::default()
            };
            let hits = notebook.search(&query, &filter)?;
            if hits.is_empty() {
                writeln!(out, "No matches for '{query}'.")?;
            }
            for hit in &hits {
                writeln!(out, "{}", note_row(&hit.note))?;
                for line in textwrap::wrap(&hit.snippet, SNIPPET_WIDTH) {
                    writeln!(out, "      {line}")?;
                }
            }
        }
        Command::Edit { id } => {
            let reconciled = editor::edit_note(notebook, id, &config.editor)?;
            let message = if reconciled.changed { "Note saved" } else { "No changes" };
            match reconciled.warning {
                Some(warning) => writeln!(out, "{message} ({warning})")?,
                None => writeln!(out, "{message}")?,
            }
        }
        Command::Templates => {
            for template in notebook.list_templates()? {
                let default = if template.is_default { " (default)" } else { "" };
                writeln!(
                    out,
                    "{} {:<18} {:<5}{default}  {}",
                    template.icon,
                    template.name,
                    template.kind.as_str(),
                    template.description
                )?;
            }
        }
        Command::Folders => {
            let counts = notebook.note_counts()?;
            let all: HashSet<FolderId> = notebook.list_folders()?.iter().map(|f| f.id).collect();
            let tree = notebook.folder_tree(&all)?;
            writeln!(out, "📥 Inbox ({})", counts.unfiled)?;
            for node in tree.visible() {
                writeln!(
                    out,
                    "{}{} {} ({})",
                    "  ".repeat(node.depth),
                    node.folder.icon,
                    node.folder.name,
                    node.note_count
                )?;
            }
        }
        Command::Mkdir { name, parent } => {
            let parent = folder_id(notebook, parent.as_deref())?;
            let folder = notebook.create_folder(NewFolder::new(name).under(parent))?;
            writeln!(out, "Created folder #{}: {}", folder.id, folder.name)?;
        }
        Command::Rmdir { name } => {
            let folder = require_folder(notebook, &name)?;
            let deletion = notebook.delete_folder(folder)?;
            writeln!(
                out,
                "Deleted folder '{name}': {} note(s) moved to Inbox, {} subfolder(s) lifted",
                deletion.notes_unfiled, deletion.subfolders_moved
            )?;
        }
        Command::Mv { id, folder } => {
            let target = folder_id(notebook, folder.as_deref())?;
            let note = notebook.move_note(id, target)?;
            let place = folder.unwrap_or_else(|| "Inbox".to_string());
            writeln!(out, "Moved #{} to {place}", note.id)?;
        }
        Command::Logs { action } => execute_logs(action, &config::log_path(), out)?,
    }
    Ok(())
}

pub fn execute_logs(action: LogsCommand, path: &Path, out: &mut impl Write) -> CliResult {
    let size = match fs::metadata(path) {
        Ok(meta) => Some(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    match action {
        LogsCommand::Path => match size {
            Some(bytes) => writeln!(out, "{} ({bytes} bytes)", path.display())?,
            None => writeln!(out, "{} (not created yet)", path.display())?,
        },
        LogsCommand::Show { lines } => {
            if size.is_none() {
                writeln!(out, "No log file at {}", path.display())?;
                return Ok(());
            }
            let text = fs::read_to_string(path)?;
            let all: Vec<&str> = text.lines().collect();
            let start = lines.map_or(0, |n| all.len().saturating_sub(n));
            for line in &all[start..] {
                writeln!(out, "{line}")?;
            }
        }
        LogsCommand::Clear => match size {
            // Truncate rather than remove: a running session keeps appending
            // to the same file.
            Some(bytes) => {
                OpenOptions::new().write(true).open(path)?.set_len(0)?;
                writeln!(out, "Cleared {} ({bytes} bytes)", path.display())?;
            }
            None => writeln!(out, "No log file at {}", path.display())?,
        },
    }
    Ok(())
}

fn require_folder(notebook: &Notebook, name: &str) -> quill::Result<FolderId> {
    notebook
        .folder_by_name(name)?
        .map(|f| f.id)
        .ok_or_else(|| Error::validation(format!("no folder named '{name}'")))
}

fn folder_id(notebook: &Notebook, name: Option<&str>) -> quill::Result<Option<FolderId>> {
    name.map(|n| require_folder(notebook, n)).transpose()
}

/// A named template must exist and match the kind; otherwise the kind's
/// default is used.
fn template_id(
    notebook: &Notebook,
    kind: TemplateKind,
    name: Option<&str>,
) -> quill::Result<Option<i64>> {
    match name {
        Some(name) => match notebook.template_by_name(name)? {
            Some(t) if t.kind == kind => Ok(Some(t.id)),
            Some(_) => Err(Error::validation(format!(
                "template '{name}' is not a {} template",
                kind.as_str()
            ))),
            None => Err(Error::validation(format!("no template named '{name}'"))),
        },
        None => Ok(notebook.default_template(kind)?.map(|t| t.id)),
    }
}

fn note_row(note: &Note) -> String {
    let status = match (note.is_todo, note.is_done) {
        (true, true) => "[x]",
        (true, false) => "[ ]",
        (false, _) => "   ",
    };
    let star = if note.starred { "★" } else { " " };
    let mut row = format!(
        "#{:<4} {status} {:<3} {star} {}",
        note.id,
        note.priority.marker(),
        note.title
    );
    if let Some(due) = note.due_at {
        row.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
    }
    row.push_str(&format!(
        "  ({})",
        note.updated_at.with_timezone(&Local).format("%Y-%m-%d")
    ));
    row
}
