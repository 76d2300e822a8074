//! Folder rows.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::core::error::{Error, Result};
use crate::core::model::{Folder, FolderId, NewFolder};
use crate::core::store::{from_millis, to_millis};

const FOLDER_COLUMNS: &str =
    "id, name, parent_id, icon, position, starred, created_at, updated_at";

fn folder_from_row(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        icon: row.get(3)?,
        position: row.get(4)?,
        starred: row.get(5)?,
        created_at: from_millis(row.get(6)?),
        updated_at: from_millis(row.get(7)?),
    })
}

/// Insert a folder at the end of its siblings.
pub fn insert(conn: &Connection, new: &NewFolder, now: DateTime<Utc>) -> Result<Folder> {
    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM folders WHERE parent_id IS ?1",
        [new.parent_id],
        |r| r.get(0),
    )?;
    let now_ms = to_millis(now);
    conn.execute(
        "INSERT INTO folders (name, parent_id, icon, position, starred, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
        params![new.name.trim(), new.parent_id, new.resolved_icon(), position, now_ms],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: FolderId) -> Result<Folder> {
    let sql = format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1");
    conn.query_row(&sql, [id], folder_from_row)
        .optional()?
        .ok_or_else(|| Error::not_found("folder", id))
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Folder>> {
    let sql = format!(
        "SELECT {FOLDER_COLUMNS} FROM folders WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
    );
    Ok(conn.query_row(&sql, [name.trim()], folder_from_row).optional()?)
}

pub fn exists(conn: &Connection, id: FolderId) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM folders WHERE id = ?1", [id], |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn update(conn: &Connection, folder: &Folder, now: DateTime<Utc>) -> Result<Folder> {
    let changed = conn.execute(
        "UPDATE folders
         SET name = ?2, parent_id = ?3, icon = ?4, position = ?5, starred = ?6, updated_at = ?7
         WHERE id = ?1",
        params![
            folder.id,
            folder.name.trim(),
            folder.parent_id,
            folder.icon,
            folder.position,
            folder.starred,
            to_millis(now),
        ],
    )?;
    if changed == 0 {
        return Err(Error::not_found("folder", folder.id));
    }
    get(conn, folder.id)
}

pub fn delete(conn: &Connection, id: FolderId) -> Result<()> {
    let changed = conn.execute("DELETE FROM folders WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(Error::not_found("folder", id));
    }
    Ok(())
}

/// All folders, siblings in display order.
pub fn list(conn: &Connection) -> Result<Vec<Folder>> {
    let sql = format!(
        "SELECT {FOLDER_COLUMNS} FROM folders ORDER BY position, name COLLATE NOCASE, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let folders = stmt
        .query_map([], folder_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(folders)
}

/// Re-point the direct children of `id` at `new_parent`.
pub fn reparent_children(
    conn: &Connection,
    id: FolderId,
    new_parent: Option<FolderId>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let moved = conn.execute(
        "UPDATE folders SET parent_id = ?2, updated_at = ?3 WHERE parent_id = ?1",
        params![id, new_parent, to_millis(now)],
    )?;
    Ok(moved)
}

/// Parent of each folder, for cycle checks without loading full rows.
pub fn parent_links(conn: &Connection) -> Result<Vec<(FolderId, Option<FolderId>)>> {
    let mut stmt = conn.prepare("SELECT id, parent_id FROM folders")?;
    let links = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::Store;

    #[test]
    fn test_insert_appends_position_per_parent() {
        let store = Store::open_in_memory().unwrap();
        let (a, b, child) = store
            .write(|tx| {
                let a = insert(tx, &NewFolder::new("A"), Utc::now())?;
                let b = insert(tx, &NewFolder::new("B"), Utc::now())?;
                let child = insert(tx, &NewFolder::new("C").under(Some(a.id)), Utc::now())?;
                Ok((a, b, child))
            })
            .unwrap();
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);
        assert_eq!(child.position, 0);
        assert_eq!(child.icon, "📁");
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let store = Store::open_in_memory().unwrap();
        store
            .write(|tx| insert(tx, &NewFolder::new("Work"), Utc::now()))
            .unwrap();
        let found = store.read(|c| find_by_name(c, "work")).unwrap();
        assert_eq!(found.map(|f| f.name), Some("Work".to_string()));
        assert!(store.read(|c| find_by_name(c, "home")).unwrap().is_none());
    }

    #[test]
    fn test_reparent_children() {
        let store = Store::open_in_memory().unwrap();
        let (root, mid, leaf) = store
            .write(|tx| {
                let root = insert(tx, &NewFolder::new("root"), Utc::now())?;
                let mid = insert(tx, &NewFolder::new("mid").under(Some(root.id)), Utc::now())?;
                let leaf = insert(tx, &NewFolder::new("leaf").under(Some(mid.id)), Utc::now())?;
                Ok((root, mid, leaf))
            })
            .unwrap();
        store
            .write(|tx| reparent_children(tx, mid.id, Some(root.id), Utc::now()))
            .unwrap();
        assert_eq!(store.read(|c| get(c, leaf.id)).unwrap().parent_id, Some(root.id));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.write(|tx| delete(tx, 3)),
            Err(Error::NotFound { entity: "folder", .. })
        ));
    }
}
