//! SQLite connection for the LinkStash SQLite storage backend.
//!
//! The database holds a single `kv_store` table; the bookmark collection lives in
//! the row keyed `"bookmarks"`. Opening a [`Database`] brings the schema up to
//! date before any backend call can reach it.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::debug;

use super::migrations;
use crate::types::errors::StorageError;

/// Migrated SQLite connection backing [`crate::storage::SqliteBackend`].
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens (or creates) the database file at `path`, creating missing parent
    /// directories, and runs migrations.
    ///
    /// # Errors
    /// [`StorageError::Io`] if the data directory cannot be created,
    /// [`StorageError::Database`] if SQLite cannot open the file or migrate it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        migrations::run_all(&conn)?;
        debug!("Opened bookmark database at {}", path.display());
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a migrated in-memory database, discarded on drop.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// File backing this database; `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
