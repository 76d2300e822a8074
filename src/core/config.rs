//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.config/quill/config.toml` (platform config dir). If
//! missing on first run, a commented-out default is generated so users can
//! discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::editor::EditorCommand;
use crate::core::model::SortField;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub todos: TodoConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EditorConfig {
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub theme: Option<Theme>,
    pub show_preview: Option<bool>,
    pub sidebar_width: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TodoConfig {
    pub show_completed: Option<bool>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NotesConfig {
    pub default_folder: Option<String>,
    pub default_template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Mono,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SIDEBAR_WIDTH: u16 = 25;
pub const MIN_SIDEBAR_WIDTH: u16 = 10;
pub const MAX_SIDEBAR_WIDTH: u16 = 60;
pub const DEFAULT_TODO_SORT: SortField = SortField::Priority;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Immutable settings handed to the session at startup.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub db_path: PathBuf,
    pub editor: EditorCommand,
    pub theme: Theme,
    pub show_preview: bool,
    /// Percent of terminal width for the navigation panel.
    pub sidebar_width: u16,
    pub show_completed: bool,
    pub todo_sort: SortField,
    pub default_folder: Option<String>,
    pub default_template: Option<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&QuillConfig::default(), None)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `<config_dir>/quill/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quill").join("config.toml"))
}

/// Default database location, `<data_dir>/quill/quill.db`.
pub fn default_db_path() -> PathBuf {
    data_dir().join("quill.db")
}

/// Where the database and log file live by default.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quill")
}

/// The log file the binary appends to.
pub fn log_path() -> PathBuf {
    data_dir().join("quill.log")
}

/// Load config from `path`, or the default location when `None`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `QuillConfig::default()`. An explicit path that doesn't exist is
/// an error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<QuillConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => {
                if !p.exists() {
                    info!("No config file found, generating default at {}", p.display());
                    generate_default_config(&p);
                    return Ok(QuillConfig::default());
                }
                p
            }
            None => {
                warn!("Could not determine config directory, using default config");
                return Ok(QuillConfig::default());
            }
        },
    };

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: QuillConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Quill Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [storage]
# path = "~/.local/share/quill/quill.db"   # Or set QUILL_DB, or pass --db

# [editor]
# command = "nvim"          # Falls back to $VISUAL, $EDITOR, then nvim/vim/vi/nano
# args = []

# [ui]
# theme = "default"         # "default" or "mono"
# show_preview = true
# sidebar_width = 25        # Percent of terminal width (10-60)

# [todos]
# show_completed = true
# sort_by = "priority"      # "priority", "due", "created", "updated", "title"

# [notes]
# default_folder = "Inbox"  # Folder name for new notes outside a folder view
# default_template = "Blank Note"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_db` is the `--db` flag (None = not specified).
pub fn resolve(config: &QuillConfig, cli_db: Option<&Path>) -> ResolvedConfig {
    // Database: CLI → env → config → default
    let db_path = cli_db
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("QUILL_DB").map(PathBuf::from))
        .or_else(|| config.storage.path.as_deref().map(expand_home))
        .unwrap_or_else(default_db_path);

    // Editor: config → $VISUAL → $EDITOR → PATH probe
    let editor = EditorCommand::resolve(config.editor.command.as_deref(), &config.editor.args);

    let todo_sort = match config.todos.sort_by.as_deref() {
        Some(raw) => SortField::parse(raw).unwrap_or_else(|| {
            warn!("Unknown todos.sort_by '{raw}', using priority");
            DEFAULT_TODO_SORT
        }),
        None => DEFAULT_TODO_SORT,
    };

    ResolvedConfig {
        db_path,
        editor,
        theme: config.ui.theme.unwrap_or_default(),
        show_preview: config.ui.show_preview.unwrap_or(true),
        sidebar_width: config
            .ui
            .sidebar_width
            .unwrap_or(DEFAULT_SIDEBAR_WIDTH)
            .clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH),
        show_completed: config.todos.show_completed.unwrap_or(true),
        todo_sort,
        default_folder: non_empty(config.notes.default_folder.as_deref()),
        default_template: non_empty(config.notes.default_template.as_deref()),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = QuillConfig::default();
        assert!(config.storage.path.is_none());
        assert!(config.editor.args.is_empty());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&QuillConfig::default(), Some(Path::new("/tmp/q.db")));
        assert_eq!(resolved.sidebar_width, DEFAULT_SIDEBAR_WIDTH);
        assert!(resolved.show_preview);
        assert!(resolved.show_completed);
        assert_eq!(resolved.todo_sort, SortField::Priority);
        assert_eq!(resolved.theme, Theme::Default);
        assert!(resolved.default_folder.is_none());
    }

    #[test]
    fn test_cli_db_wins() {
        let config = QuillConfig {
            storage: StorageConfig {
                path: Some(PathBuf::from("/from/config.db")),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some(Path::new("/from/cli.db")));
        assert_eq!(resolved.db_path, PathBuf::from("/from/cli.db"));
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[storage]
path = "/data/notes.db"

[editor]
command = "code"
args = ["--wait"]

[ui]
theme = "mono"
show_preview = false
sidebar_width = 95

[todos]
show_completed = false
sort_by = "due"

[notes]
default_folder = "Inbox"
default_template = "  "
"#;
        let config: QuillConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve(&config, Some(Path::new("/x.db")));
        assert_eq!(resolved.editor, EditorCommand::new("code", vec!["--wait".into()]));
        assert_eq!(resolved.theme, Theme::Mono);
        assert!(!resolved.show_preview);
        assert_eq!(resolved.sidebar_width, MAX_SIDEBAR_WIDTH);
        assert!(!resolved.show_completed);
        assert_eq!(resolved.todo_sort, SortField::Due);
        assert_eq!(resolved.default_folder.as_deref(), Some("Inbox"));
        assert!(resolved.default_template.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[ui]
show_preview = false
"#;
        let config: QuillConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ui.show_preview, Some(false));
        assert!(config.ui.theme.is_none());
        assert!(config.editor.command.is_none());
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let config = QuillConfig {
            todos: TodoConfig {
                sort_by: Some("size".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, None).todo_sort, DEFAULT_TODO_SORT);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[notes]\ndefault_folder = \"Work\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.notes.default_folder.as_deref(), Some("Work"));

        fs::write(&path, "[notes\n").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_config(Some(&dir.path().join("missing.toml"))),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/q.db")), PathBuf::from("/abs/q.db"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/q.db")), home.join("q.db"));
        }
    }
}
