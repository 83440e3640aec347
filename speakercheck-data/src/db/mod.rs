pub mod migrations;
pub mod pages;
pub mod sessions;
pub mod speakers;
pub mod users;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

pub use rusqlite::Error as RusqliteError;

/// Open or create the SQLite database at the given path and bring its schema up to date.
///
/// Sets WAL journal mode and enables foreign keys.
/// Creates parent directories if needed.
pub fn open_or_create(path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some(format!("Cannot create directory {}: {}", parent.display(), e)),
            )
        })?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    migrations::migrate(&conn)?;
    Ok(conn)
}

/// Open a private in-memory database with migrations applied.
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    migrations::migrate(&conn)?;
    Ok(conn)
}

/// Returns the default database path: `~/.local/share/speakercheck/speakercheck.db`
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("speakercheck")
        .join("speakercheck.db")
}

/// Current time as an RFC 3339 string, the timestamp format of every table.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Extension trait to convert rusqlite::Error to Option for query_row
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Create an in-memory database with migrations applied, for testing.
#[cfg(test)]
pub fn test_db() -> Connection {
    open_in_memory().expect("open in-memory db")
}
