//! Template rows. Variables are stored as a JSON array.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::core::error::{Error, Result};
use crate::core::model::{NewTemplate, Template, TemplateId, TemplateKind, TemplateVariable};
use crate::core::store::{from_millis, is_unique_violation, to_millis};

const TEMPLATE_COLUMNS: &str =
    "id, name, description, body, kind, icon, variables, is_default, created_at, updated_at";

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<Template> {
    let kind: String = row.get(4)?;
    let raw_variables: String = row.get(6)?;
    let variables: Vec<TemplateVariable> = serde_json::from_str(&raw_variables)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        body: row.get(3)?,
        kind: TemplateKind::parse(&kind),
        icon: row.get(5)?,
        variables,
        is_default: row.get(7)?,
        created_at: from_millis(row.get(8)?),
        updated_at: from_millis(row.get(9)?),
    })
}

fn encode_variables(variables: &[TemplateVariable]) -> Result<String> {
    serde_json::to_string(variables)
        .map_err(|e| Error::validation(format!("template variables: {e}")))
}

fn map_write_error(err: rusqlite::Error, name: &str) -> Error {
    if is_unique_violation(&err) {
        return Error::validation(format!("a template named '{}' already exists", name.trim()));
    }
    err.into()
}

pub fn insert(conn: &Connection, new: &NewTemplate, now: DateTime<Utc>) -> Result<Template> {
    let now_ms = to_millis(now);
    conn.execute(
        "INSERT INTO templates (name, description, body, kind, icon, variables, is_default,
                                created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            new.name.trim(),
            new.description,
            new.body,
            new.kind.as_str(),
            new.resolved_icon(),
            encode_variables(&new.variables)?,
            new.is_default,
            now_ms,
        ],
    )
    .map_err(|e| map_write_error(e, &new.name))?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: TemplateId) -> Result<Template> {
    let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1");
    conn.query_row(&sql, [id], template_from_row)
        .optional()?
        .ok_or_else(|| Error::not_found("template", id))
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Template>> {
    let sql =
        format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE name = ?1 COLLATE NOCASE LIMIT 1");
    Ok(conn.query_row(&sql, [name.trim()], template_from_row).optional()?)
}

/// The default-flagged template of a kind, oldest first if several exist.
pub fn default_for(conn: &Connection, kind: TemplateKind) -> Result<Option<Template>> {
    let sql = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM templates
         WHERE kind = ?1 AND is_default = 1 ORDER BY id LIMIT 1"
    );
    Ok(conn.query_row(&sql, [kind.as_str()], template_from_row).optional()?)
}

pub fn update(conn: &Connection, template: &Template, now: DateTime<Utc>) -> Result<Template> {
    let changed = conn
        .execute(
            "UPDATE templates
             SET name = ?2, description = ?3, body = ?4, kind = ?5, icon = ?6, variables = ?7,
                 is_default = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                template.id,
                template.name.trim(),
                template.description,
                template.body,
                template.kind.as_str(),
                template.icon,
                encode_variables(&template.variables)?,
                template.is_default,
                to_millis(now),
            ],
        )
        .map_err(|e| map_write_error(e, &template.name))?;
    if changed == 0 {
        return Err(Error::not_found("template", template.id));
    }
    get(conn, template.id)
}

pub fn delete(conn: &Connection, id: TemplateId) -> Result<()> {
    let changed = conn.execute("DELETE FROM templates WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(Error::not_found("template", id));
    }
    Ok(())
}

/// Notes first, then todos, each alphabetically.
pub fn list(conn: &Connection) -> Result<Vec<Template>> {
    let sql = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY kind, name COLLATE NOCASE, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let templates = stmt
        .query_map([], template_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(templates)
}

pub fn count(conn: &Connection) -> Result<u64> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM templates", [], |r| r.get(0))?;
    Ok(n.max(0) as u64)
}
