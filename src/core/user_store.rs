use crate::domain::model::StoredUser;
use crate::domain::ports::UserRepository;
use crate::utils::error::Result;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::time::Duration;

pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite 使用者資料表；所有查詢都使用參數綁定，不做字串拼接
pub struct SqliteUserStore {
    conn: Connection,
}

impl SqliteUserStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// 唯讀開啟：讀取路徑不需要寫入權限
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL)",
            [],
        )?;
        Ok(())
    }

    pub fn insert_user(&self, user: &StoredUser) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, email) VALUES (?1, ?2, ?3)",
            params![user.id, user.name, user.email],
        )?;
        Ok(())
    }

    pub fn count_users(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }
}

impl UserRepository for SqliteUserStore {
    fn find_user(&self, id: &str) -> Result<Option<StoredUser>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, email FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredUser {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

/// 查無資料或資料庫失敗時都回傳預設值
pub fn get_user_or_default<R: UserRepository + ?Sized>(
    repo: &R,
    id: &str,
    default: StoredUser,
) -> StoredUser {
    match repo.find_user(id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("User {} not found. Using default data.", id);
            default
        }
        Err(e) => {
            tracing::error!("Database error: {}. Using fail-safe default data.", e);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GuardError;
    use tempfile::TempDir;

    fn fallback() -> StoredUser {
        StoredUser {
            id: "0".to_string(),
            name: "Unknown".to_string(),
            email: "no-reply@example.com".to_string(),
        }
    }

    fn seeded_store() -> SqliteUserStore {
        let store = SqliteUserStore::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store
            .insert_user(&StoredUser {
                id: "123".to_string(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_find_existing_user() {
        let store = seeded_store();
        let user = get_user_or_default(&store, "123", fallback());
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn test_missing_user_returns_default() {
        let store = seeded_store();
        assert_eq!(get_user_or_default(&store, "999", fallback()), fallback());
    }

    #[test]
    fn test_injection_attempt_is_treated_as_data() {
        let store = seeded_store();
        let hostile = "123' OR '1'='1";
        assert!(store.find_user(hostile).unwrap().is_none());

        store
            .insert_user(&StoredUser {
                id: "x'); DROP TABLE users; --".to_string(),
                name: "Mallory".to_string(),
                email: "m@example.com".to_string(),
            })
            .unwrap();
        assert_eq!(store.count_users().unwrap(), 2);
    }

    #[test]
    fn test_database_error_returns_default() {
        // 沒有建立資料表，查詢會失敗
        let store = SqliteUserStore::open_in_memory().unwrap();
        assert!(matches!(
            store.find_user("123"),
            Err(GuardError::DatabaseError(_))
        ));
        assert_eq!(get_user_or_default(&store, "123", fallback()), fallback());
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.db");
        {
            let store = SqliteUserStore::open(&path).unwrap();
            store.create_schema().unwrap();
        }

        let ro = SqliteUserStore::open_read_only(&path).unwrap();
        assert!(ro.insert_user(&fallback()).is_err());
        assert!(ro.find_user("0").unwrap().is_none());
    }
}
