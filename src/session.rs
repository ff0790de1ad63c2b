/// Client-local session slot.
///
/// A small key/value table that keeps the current user across restarts.
/// Everything else the server knows lives in memory only.

use crate::error::Result;
use crate::store::models::User;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// Key under which the logged-in user is persisted
pub const CURRENT_USER_KEY: &str = "currentUser";

/// SQLite-backed key/value slot
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open (or create) a session slot at the given path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Session slot that disappears with the process
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self { conn })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            (key, value, updated_at),
        )?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt
            .query_row((key,), |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", (key,))?;
        Ok(())
    }

    /// Persist the logged-in user as JSON
    pub fn save_current_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.set(CURRENT_USER_KEY, &json)
    }

    /// Load the persisted user.
    ///
    /// An undecodable record is reported and treated as an empty slot.
    pub fn load_current_user(&self) -> Result<Option<User>> {
        let Some(json) = self.get(CURRENT_USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                log::warn!("Ignoring corrupt session slot: {}", e);
                Ok(None)
            }
        }
    }

    pub fn clear_current_user(&self) -> Result<()> {
        self.remove(CURRENT_USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::latency::Latency;
    use crate::scheduler::SystemClock;
    use crate::store::ChatStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn ahmet() -> User {
        User::new("1", "ahmet", "ahmet@example.com", true)
    }

    #[test]
    fn test_initialize_creates_kv_table() {
        let store = SessionStore::in_memory().unwrap();

        let tables: Vec<String> = store
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"kv".to_string()));
    }

    #[test]
    fn test_save_and_load_current_user() {
        let store = SessionStore::in_memory().unwrap();
        store.save_current_user(&ahmet()).unwrap();

        let loaded = store.load_current_user().unwrap();
        assert_eq!(loaded, Some(ahmet()));
    }

    #[test]
    fn test_clear_current_user() {
        let store = SessionStore::in_memory().unwrap();
        store.save_current_user(&ahmet()).unwrap();
        store.clear_current_user().unwrap();

        assert!(store.load_current_user().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_slot_reads_as_empty() {
        let store = SessionStore::in_memory().unwrap();
        store.set(CURRENT_USER_KEY, "not json").unwrap();

        assert!(store.load_current_user().unwrap().is_none());
    }

    #[test]
    fn test_slot_survives_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("session.db");

        {
            let store = SessionStore::new(&db_path).unwrap();
            store.save_current_user(&ahmet()).unwrap();
        }

        let reopened = SessionStore::new(&db_path).unwrap();
        assert_eq!(reopened.load_current_user().unwrap(), Some(ahmet()));
    }

    #[tokio::test]
    async fn test_failed_slot_write_leaves_directory_unchanged() {
        let session = SessionStore::in_memory().unwrap();
        session.conn.execute_batch("DROP TABLE kv").unwrap();
        let store = ChatStore::new(session, Latency::disabled(), Arc::new(SystemClock));

        let result = store.register("zeynep", "zeynep@example.com", "pw").await;
        assert!(matches!(result, Err(StoreError::Session(_))));
        assert!(store.get_user_by_id("6").await.unwrap().is_none());

        // A retry reports the slot again, not a duplicate user
        let retry = store.register("zeynep", "zeynep@example.com", "pw").await;
        assert!(matches!(retry, Err(StoreError::Session(_))));
    }
}
