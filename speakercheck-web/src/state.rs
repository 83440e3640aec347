use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use speakercheck_data::{db, Connection};

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Single SQLite connection; holding the guard serializes writes.
    conn: Mutex<Connection>,
    bcrypt_cost: u32,
}

impl AppState {
    pub fn new(conn: Connection, bcrypt_cost: u32) -> Arc<Self> {
        Arc::new(Self {
            conn: Mutex::new(conn),
            bcrypt_cost,
        })
    }

    /// Open (or create) the database file and run migrations.
    pub fn open(db_path: &Path, bcrypt_cost: u32) -> anyhow::Result<Arc<Self>> {
        let conn = db::open_or_create(db_path)?;
        Ok(Self::new(conn, bcrypt_cost))
    }

    pub fn in_memory(bcrypt_cost: u32) -> anyhow::Result<Arc<Self>> {
        let conn = db::open_in_memory()?;
        Ok(Self::new(conn, bcrypt_cost))
    }

    pub async fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_state_has_schema() {
        let state = AppState::in_memory(4).unwrap();
        let conn = state.conn().await;
        assert!(db::pages::list(&conn).unwrap().is_empty());
        assert_eq!(state.bcrypt_cost(), 4);
    }

    #[tokio::test]
    async fn test_open_creates_db_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data").join("speakercheck.db");

        let state = AppState::open(&db_path, 4).unwrap();
        assert!(db_path.exists());
        assert_eq!(db::users::count(&*state.conn().await).unwrap(), 0);
    }
}
