//! The SQLite file that backs [`SqliteRegistry`](crate::registry::SqliteRegistry).
//!
//! Opening a [`Database`] always leaves it at the current registry schema.

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, warn};

use super::migrations;

/// A registry database with its schema migrated.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the registry database at `path`, creating the file and any
    /// missing parent directories.
    ///
    /// # Errors
    /// `rusqlite::Error::InvalidPath` when the parent directory cannot be
    /// created, otherwise whatever SQLite reports for the open or migration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        debug!(path = %path.display(), "opening registry database");
        Self::migrated(Connection::open(path)?)
    }

    /// A private registry that lives as long as the returned value.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), rusqlite::Error> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(parent).map_err(|e| {
        warn!(dir = %parent.display(), error = %e, "cannot create database directory");
        rusqlite::Error::InvalidPath(parent.to_path_buf())
    })
}
