use rusqlite::{params, Connection, OptionalExtension, Result};

/// A single string-valued entry of the shared key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub key: String,
    pub value: String,
}

impl Preference {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<Self> {
        conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = strftime('%s', 'now')",
            params![key, value],
        )?;
        Ok(Self { key: key.to_string(), value: value.to_string() })
    }

    /// Returns true if a value was present.
    pub fn remove(conn: &Connection, key: &str) -> Result<bool> {
        let affected = conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_get_missing_key_returns_none() {
        let (db, _dir) = setup_test_db();
        assert_eq!(Preference::get(db.connection(), "missing").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let pref = Preference::set(conn, "native_locked_apps", "com.a,com.b").unwrap();
        assert_eq!(pref.value, "com.a,com.b");
        assert_eq!(
            Preference::get(conn, "native_locked_apps").unwrap().as_deref(),
            Some("com.a,com.b")
        );
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        Preference::set(conn, "k", "first").unwrap();
        Preference::set(conn, "k", "second").unwrap();

        assert_eq!(Preference::get(conn, "k").unwrap().as_deref(), Some("second"));
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM preferences WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_remove() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        Preference::set(conn, "k", "v").unwrap();
        assert!(Preference::remove(conn, "k").unwrap());
        assert!(!Preference::remove(conn, "k").unwrap());
        assert_eq!(Preference::get(conn, "k").unwrap(), None);
    }
}
