//! Note rows. The FTS index follows these writes through triggers.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::core::error::{Error, Result};
use crate::core::model::{FolderId, FolderScope, NewNote, Note, NoteFilter, NoteId, Priority, SortField};
use crate::core::store::{from_millis, to_millis};

/// Select list matching [`note_from_row`]. Expects the table aliased as `n`.
pub(crate) const NOTE_COLUMNS: &str = "n.id, n.title, n.body, n.folder_id, n.template_id, \
     n.is_todo, n.is_done, n.priority, n.due_at, n.tags, n.starred, n.created_at, n.updated_at";

/// Number of columns in [`NOTE_COLUMNS`].
pub(crate) const NOTE_COLUMN_COUNT: usize = 13;

pub(crate) fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        folder_id: row.get(3)?,
        template_id: row.get(4)?,
        is_todo: row.get(5)?,
        is_done: row.get(6)?,
        priority: Priority::from_i64(row.get(7)?),
        due_at: row.get::<_, Option<i64>>(8)?.map(from_millis),
        tags: row.get(9)?,
        starred: row.get(10)?,
        created_at: from_millis(row.get(11)?),
        updated_at: from_millis(row.get(12)?),
    })
}

pub fn insert(conn: &Connection, new: &NewNote, now: DateTime<Utc>) -> Result<Note> {
    let now_ms = to_millis(now);
    conn.execute(
        "INSERT INTO notes (title, body, folder_id, template_id, is_todo, is_done, priority,
                            due_at, tags, starred, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            new.title.trim(),
            new.body,
            new.folder_id,
            new.template_id,
            new.is_todo,
            new.priority.as_i64(),
            new.due_at.map(to_millis),
            new.tags.trim(),
            new.starred,
            now_ms,
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: NoteId) -> Result<Note> {
    let sql = format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.id = ?1");
    conn.query_row(&sql, [id], note_from_row)
        .optional()?
        .ok_or_else(|| Error::not_found("note", id))
}

/// Overwrite every mutable field and stamp `updated_at`.
pub fn update(conn: &Connection, note: &Note, now: DateTime<Utc>) -> Result<Note> {
    let changed = conn.execute(
        "UPDATE notes
         SET title = ?2, body = ?3, folder_id = ?4, template_id = ?5, is_todo = ?6,
             is_done = ?7, priority = ?8, due_at = ?9, tags = ?10, starred = ?11,
             updated_at = ?12
         WHERE id = ?1",
        params![
            note.id,
            note.title.trim(),
            note.body,
            note.folder_id,
            note.template_id,
            note.is_todo,
            note.is_done,
            note.priority.as_i64(),
            note.due_at.map(to_millis),
            note.tags.trim(),
            note.starred,
            to_millis(now),
        ],
    )?;
    if changed == 0 {
        return Err(Error::not_found("note", note.id));
    }
    get(conn, note.id)
}

pub fn delete(conn: &Connection, id: NoteId) -> Result<()> {
    let changed = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(Error::not_found("note", id));
    }
    Ok(())
}

pub fn list(conn: &Connection, filter: &NoteFilter) -> Result<Vec<Note>> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    push_filter(filter, &mut clauses, &mut values);

    let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes n");
    push_where(&mut sql, &clauses);
    sql.push_str(" ORDER BY ");
    sql.push_str(&order_clause(filter));
    push_page(&mut sql, filter, &mut values);

    let mut stmt = conn.prepare(&sql)?;
    let notes = stmt
        .query_map(params_from_iter(values), note_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

/// Count notes matching `filter`, ignoring sort and paging.
pub fn count(conn: &Connection, filter: &NoteFilter) -> Result<u64> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    push_filter(filter, &mut clauses, &mut values);

    let mut sql = String::from("SELECT COUNT(*) FROM notes n");
    push_where(&mut sql, &clauses);
    let count: i64 = conn.query_row(&sql, params_from_iter(values), |r| r.get(0))?;
    Ok(count.max(0) as u64)
}

/// Note counts grouped by folder. `None` is the unfiled bucket.
pub fn counts_by_folder(conn: &Connection) -> Result<Vec<(Option<FolderId>, u64)>> {
    let mut stmt = conn.prepare("SELECT folder_id, COUNT(*) FROM notes GROUP BY folder_id")?;
    let rows = stmt
        .query_map([], |row| {
            let folder: Option<FolderId> = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((folder, count.max(0) as u64))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Move every note in `folder_id` to no folder. Returns how many moved.
pub fn clear_folder(conn: &Connection, folder_id: FolderId, now: DateTime<Utc>) -> Result<usize> {
    let moved = conn.execute(
        "UPDATE notes SET folder_id = NULL, updated_at = ?2 WHERE folder_id = ?1",
        params![folder_id, to_millis(now)],
    )?;
    Ok(moved)
}

// ============================================================================
// Query building, shared with search
// ============================================================================

pub(crate) fn push_filter(filter: &NoteFilter, clauses: &mut Vec<String>, values: &mut Vec<Value>) {
    match filter.folder {
        FolderScope::Any => {}
        FolderScope::Unfiled => clauses.push("n.folder_id IS NULL".to_string()),
        FolderScope::In(id) => {
            clauses.push("n.folder_id = ?".to_string());
            values.push(Value::Integer(id));
        }
    }
    let flags = [
        ("n.is_todo", filter.is_todo),
        ("n.is_done", filter.is_done),
        ("n.starred", filter.starred),
    ];
    for (column, wanted) in flags {
        if let Some(wanted) = wanted {
            clauses.push(format!("{column} = ?"));
            values.push(Value::Integer(i64::from(wanted)));
        }
    }
    if let Some(priority) = filter.priority {
        clauses.push("n.priority = ?".to_string());
        values.push(Value::Integer(priority.as_i64()));
    }
}

pub(crate) fn push_where(sql: &mut String, clauses: &[String]) {
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

pub(crate) fn push_page(sql: &mut String, filter: &NoteFilter, values: &mut Vec<Value>) {
    sql.push_str(" LIMIT ? OFFSET ?");
    values.push(Value::Integer(filter.limit.map_or(-1, i64::from)));
    values.push(Value::Integer(i64::from(filter.offset)));
}

fn order_clause(filter: &NoteFilter) -> String {
    let dir = if filter.descending { "DESC" } else { "ASC" };
    let primary = match filter.sort {
        SortField::Created => format!("n.created_at {dir}"),
        SortField::Updated => format!("n.updated_at {dir}"),
        SortField::Title => format!("n.title COLLATE NOCASE {dir}"),
        SortField::Priority => format!("n.priority {dir}, n.updated_at DESC"),
        // Undated todos sink to the bottom either way.
        SortField::Due => format!("n.due_at IS NULL, n.due_at {dir}"),
    };
    format!("{primary}, n.id ASC")
}
