//! Full-text search over note title, body and tags.
//!
//! Queries use FTS5 syntax (`foo bar`, `"exact phrase"`, `foo OR bar`,
//! `prefix*`, `tags:work`). Input the index rejects as a syntax error is
//! retried with every whitespace-separated term quoted and AND-joined, so
//! typing `c++` or `half-done` still finds something.
//!
//! Results are ordered by bm25 rank (lower is better), then most recently
//! updated, then id.

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use log::debug;

use crate::core::error::Result;
use crate::core::model::{Note, NoteFilter};
use crate::core::store::notes::{
    NOTE_COLUMNS, NOTE_COLUMN_COUNT, note_from_row, push_filter, push_page, push_where,
};

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub note: Note,
    /// Best-matching fragment with matches wrapped in `[` `]`.
    pub snippet: String,
    /// bm25 score. Lower is more relevant.
    pub rank: f64,
}

pub fn search(conn: &Connection, query: &str, filter: &NoteFilter) -> Result<Vec<SearchHit>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    match run(conn, query, filter) {
        Err(err) if is_match_syntax_error(&err) => {
            let Some(escaped) = escape_terms(query) else {
                return Ok(Vec::new());
            };
            debug!("FTS rejected '{query}', retrying as {escaped}");
            Ok(run(conn, &escaped, filter)?)
        }
        other => Ok(other?),
    }
}

fn run(conn: &Connection, expr: &str, filter: &NoteFilter) -> rusqlite::Result<Vec<SearchHit>> {
    let mut clauses = vec!["notes_fts MATCH ?".to_string()];
    let mut values = vec![Value::Text(expr.to_string())];
    push_filter(filter, &mut clauses, &mut values);

    let mut sql = format!(
        "SELECT {NOTE_COLUMNS},
                snippet(notes_fts, -1, '[', ']', '…', 12) AS excerpt,
                bm25(notes_fts) AS score
         FROM notes_fts
         JOIN notes n ON n.id = notes_fts.rowid"
    );
    push_where(&mut sql, &clauses);
    sql.push_str(" ORDER BY score, n.updated_at DESC, n.id ASC");
    push_page(&mut sql, filter, &mut values);

    let mut stmt = conn.prepare(&sql)?;
    let hits = stmt
        .query_map(params_from_iter(values), |row| {
            Ok(SearchHit {
                note: note_from_row(row)?,
                snippet: row.get(NOTE_COLUMN_COUNT)?,
                rank: row.get(NOTE_COLUMN_COUNT + 1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(hits)
}

fn escape_terms(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
                || msg.contains("no such column")
        }
        _ => false,
    }
}
