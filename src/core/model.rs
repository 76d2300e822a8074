//! # Domain Model
//!
//! Notes, folders and templates, plus the pure validation rules applied
//! before every write. Nothing here touches storage.
//!
//! ```text
//! Folder ◄── parent_id ── Folder
//!   ▲
//!   │ folder_id
//! Note ── template_id ──► Template
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

pub type NoteId = i64;
pub type FolderId = i64;
pub type TemplateId = i64;

pub const DEFAULT_FOLDER_ICON: &str = "📁";
pub const DEFAULT_NOTE_ICON: &str = "📝";
pub const DEFAULT_TODO_ICON: &str = "☑";

// ============================================================================
// Priority
// ============================================================================

/// Todo priority. Persisted as 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Out-of-range values reset to `None`.
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => Priority::Low,
            2 => Priority::Medium,
            3 => Priority::High,
            _ => Priority::None,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Priority::None => 0,
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// none → low → medium → high → none
    pub fn next(self) -> Self {
        match self {
            Priority::None => Priority::Low,
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Compact marker for list rows. Empty for `None`.
    pub fn marker(self) -> &'static str {
        match self {
            Priority::None => "",
            Priority::Low => "!",
            Priority::Medium => "!!",
            Priority::High => "!!!",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "0" => Some(Priority::None),
            "low" | "1" => Some(Priority::Low),
            "medium" | "med" | "2" => Some(Priority::Medium),
            "high" | "3" => Some(Priority::High),
            _ => None,
        }
    }
}

// ============================================================================
// Note
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub folder_id: Option<FolderId>,
    pub template_id: Option<TemplateId>,
    pub is_todo: bool,
    /// Only meaningful when `is_todo` is set.
    pub is_done: bool,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
    /// Free-form, indexed for search.
    pub tags: String,
    pub starred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Rejects an empty title and clears `is_done` on plain notes.
    pub fn validate(&mut self) -> Result<()> {
        validate_name("note title", &self.title)?;
        if !self.is_todo {
            self.is_done = false;
        }
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_todo && !self.is_done && self.due_at.is_some_and(|due| due < now)
    }
}

/// Input for creating a note. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub body: String,
    pub folder_id: Option<FolderId>,
    pub template_id: Option<TemplateId>,
    pub is_todo: bool,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
    pub tags: String,
    pub starred: bool,
}

impl NewNote {
    pub fn note(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn todo(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_todo: true,
            ..Default::default()
        }
    }

    pub fn in_folder(mut self, folder_id: Option<FolderId>) -> Self {
        self.folder_id = folder_id;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("note title", &self.title)
    }
}

// ============================================================================
// Folder
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub icon: String,
    pub position: i64,
    pub starred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub fn validate(&mut self) -> Result<()> {
        validate_name("folder name", &self.name)?;
        if self.parent_id == Some(self.id) {
            return Err(Error::validation("a folder cannot be its own parent"));
        }
        if self.icon.trim().is_empty() {
            self.icon = DEFAULT_FOLDER_ICON.to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFolder {
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub icon: Option<String>,
}

impl NewFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent_id: Option<FolderId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn resolved_icon(&self) -> String {
        match self.icon.as_deref().map(str::trim) {
            Some(icon) if !icon.is_empty() => icon.to_string(),
            _ => DEFAULT_FOLDER_ICON.to_string(),
        }
    }
}

// ============================================================================
// Template
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Note,
    Todo,
}

impl TemplateKind {
    /// Anything unrecognised is a plain note template.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => TemplateKind::Todo,
            _ => TemplateKind::Note,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Note => "note",
            TemplateKind::Todo => "todo",
        }
    }

    pub fn default_icon(self) -> &'static str {
        match self {
            TemplateKind::Note => DEFAULT_NOTE_ICON,
            TemplateKind::Todo => DEFAULT_TODO_ICON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    /// Body skeleton. Placeholder tokens are kept as written.
    pub body: String,
    pub kind: TemplateKind,
    pub icon: String,
    pub variables: Vec<TemplateVariable>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn validate(&mut self) -> Result<()> {
        validate_name("template name", &self.name)?;
        if self.icon.trim().is_empty() {
            self.icon = self.kind.default_icon().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub body: String,
    pub kind: TemplateKind,
    pub icon: Option<String>,
    pub variables: Vec<TemplateVariable>,
    pub is_default: bool,
}

impl NewTemplate {
    pub fn validate(&self) -> Result<()> {
        validate_name("template name", &self.name)
    }

    pub fn resolved_icon(&self) -> String {
        match self.icon.as_deref().map(str::trim) {
            Some(icon) if !icon.is_empty() => icon.to_string(),
            _ => self.kind.default_icon().to_string(),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Which folder a listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderScope {
    #[default]
    Any,
    /// Notes with no folder.
    Unfiled,
    In(FolderId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Created,
    #[default]
    Updated,
    Title,
    Priority,
    Due,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" | "created_at" => Some(SortField::Created),
            "updated" | "updated_at" => Some(SortField::Updated),
            "title" => Some(SortField::Title),
            "priority" => Some(SortField::Priority),
            "due" | "due_at" | "due_date" => Some(SortField::Due),
            _ => None,
        }
    }
}

/// Listing filter. `None` fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFilter {
    pub folder: FolderScope,
    pub is_todo: Option<bool>,
    pub is_done: Option<bool>,
    pub starred: Option<bool>,
    pub priority: Option<Priority>,
    pub sort: SortField,
    pub descending: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            folder: FolderScope::Any,
            is_todo: None,
            is_done: None,
            starred: None,
            priority: None,
            sort: SortField::Updated,
            descending: true,
            limit: None,
            offset: 0,
        }
    }
}

impl NoteFilter {
    pub fn in_folder(folder_id: FolderId) -> Self {
        Self {
            folder: FolderScope::In(folder_id),
            ..Default::default()
        }
    }

    pub fn todos() -> Self {
        Self {
            is_todo: Some(true),
            ..Default::default()
        }
    }

    pub fn starred() -> Self {
        Self {
            starred: Some(true),
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, sort: SortField) -> Self {
        self.sort = sort;
        // Priority reads best highest-first, due dates soonest-first.
        self.descending = !matches!(sort, SortField::Title | SortField::Due);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

/// Names are single-line: a note title is line 1 of the editor buffer.
fn validate_name(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    if value.contains(['\n', '\r']) {
        return Err(Error::validation(format!("{what} must be a single line")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_note;

    #[test]
    fn test_priority_cycle_has_length_four() {
        let mut p = Priority::None;
        for _ in 0..4 {
            p = p.next();
        }
        assert_eq!(p, Priority::None);
        assert_eq!(Priority::Medium.next(), Priority::High);
    }

    #[test]
    fn test_priority_out_of_range_resets_to_none() {
        assert_eq!(Priority::from_i64(7), Priority::None);
        assert_eq!(Priority::from_i64(-1), Priority::None);
        assert_eq!(Priority::from_i64(2), Priority::Medium);
    }

    #[test]
    fn test_note_validate_rejects_blank_title() {
        let mut note = sample_note(1, "   ");
        assert!(matches!(note.validate(), Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_titles_and_names_are_single_line() {
        let mut note = sample_note(1, "line one\nline two");
        assert!(matches!(note.validate(), Err(Error::ValidationFailed(_))));
        assert!(NewNote::note("carriage\rreturn").validate().is_err());
        assert!(NewNote::note("one line").validate().is_ok());
        assert!(NewTemplate {
            name: "Two\nLines".into(),
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_note_validate_clears_done_on_plain_note() {
        let mut note = sample_note(1, "plain");
        note.is_done = true;
        note.validate().unwrap();
        assert!(!note.is_done);

        note.is_todo = true;
        note.is_done = true;
        note.validate().unwrap();
        assert!(note.is_done);
    }

    #[test]
    fn test_template_kind_defaults_to_note() {
        assert_eq!(TemplateKind::parse("todo"), TemplateKind::Todo);
        assert_eq!(TemplateKind::parse("TODO "), TemplateKind::Todo);
        assert_eq!(TemplateKind::parse("checklist"), TemplateKind::Note);
        assert_eq!(TemplateKind::parse(""), TemplateKind::Note);
    }

    #[test]
    fn test_folder_icon_defaults() {
        assert_eq!(NewFolder::new("Work").resolved_icon(), DEFAULT_FOLDER_ICON);
        let custom = NewFolder {
            icon: Some("💼".into()),
            ..NewFolder::new("Work")
        };
        assert_eq!(custom.resolved_icon(), "💼");
    }

    #[test]
    fn test_template_icon_follows_kind() {
        let t = NewTemplate {
            name: "Chores".into(),
            kind: TemplateKind::Todo,
            ..Default::default()
        };
        assert_eq!(t.resolved_icon(), DEFAULT_TODO_ICON);
    }

    #[test]
    fn test_sort_field_direction() {
        assert!(NoteFilter::default().sorted_by(SortField::Priority).descending);
        assert!(!NoteFilter::default().sorted_by(SortField::Due).descending);
        assert_eq!(SortField::parse("due_date"), Some(SortField::Due));
        assert_eq!(SortField::parse("size"), None);
    }

    #[test]
    fn test_overdue_only_for_open_todos() {
        let now = Utc::now();
        let mut note = sample_note(1, "pay rent");
        note.due_at = Some(now - chrono::Duration::days(1));
        assert!(!note.is_overdue(now));
        note.is_todo = true;
        assert!(note.is_overdue(now));
        note.is_done = true;
        assert!(!note.is_overdue(now));
    }
}
