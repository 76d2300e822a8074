//! # Persistence & Search Layer
//!
//! SQLite storage for folders, templates and notes, plus an FTS5 index over
//! note title, body and tags.
//!
//! ```text
//! Store
//! ├── conn: Mutex<Connection>     one logical writer
//! ├── read(|conn| ..)             plain query
//! └── write(|tx| ..)              one transaction per mutation
//!
//! notes ──(AFTER INSERT/UPDATE/DELETE triggers)──► notes_fts
//! ```
//!
//! The repository functions in [`notes`], [`folders`], [`templates`] and
//! [`search`] take a `&Connection` so they compose inside a single
//! transaction. Validation happens one layer up, in
//! [`crate::core::notebook`].
//!
//! All calls are synchronous. The session engine runs them on blocking
//! worker threads.

pub mod folders;
pub mod notes;
pub mod search;
pub mod templates;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

use crate::core::error::{Result, StoreError};

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

/// Latest schema version this binary understands.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        info!("Opening store at {}", path.display());
        let mut conn = Connection::open(path).map_err(StoreError::Sqlite)?;
        // WAL keeps readers off the writer's back; not available in memory.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .map_err(StoreError::Sqlite)?;
        bootstrap(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory store");
        let mut conn = Connection::open_in_memory().map_err(StoreError::Sqlite)?;
        bootstrap(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a read-only closure against the connection.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        f(&conn)
    }

    /// Run a closure inside a transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(StoreError::Sqlite)?;
        let value = f(&tx)?;
        tx.commit().map_err(StoreError::Sqlite)?;
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-transaction rolls back when the Transaction drops, so
        // the connection is still usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn bootstrap(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(StoreError::Sqlite)?;
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(StoreError::Sqlite)?;
    apply_migrations(conn)
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let current: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(StoreError::Sqlite)?;
    let latest = latest_version();

    if current > latest {
        return Err(StoreError::SchemaTooNew {
            found: current,
            supported: latest,
        }
        .into());
    }
    if current == latest {
        debug!("Schema up to date (version {current})");
        return Ok(());
    }

    let tx = conn.transaction().map_err(StoreError::Sqlite)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!("Applying migration {}", migration.version);
        tx.execute_batch(migration.sql).map_err(StoreError::Sqlite)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            .map_err(StoreError::Sqlite)?;
    }
    tx.commit().map_err(StoreError::Sqlite)?;
    Ok(())
}

// ============================================================================
// Column helpers shared by the repositories
// ============================================================================

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
