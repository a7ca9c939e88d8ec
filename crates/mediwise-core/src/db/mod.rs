//! Database layer: read-only access to seller inventory.

mod inventory;
mod schema;

pub use schema::*;

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Missing table: {0}")]
    MissingTable(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing inventory database without write access.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let db = Self { conn };
        db.require_table(INVENTORY_TABLE)?;
        info!("Opened inventory database {}", path.as_ref().display());
        Ok(db)
    }

    /// Create in-memory database with the schema applied (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Open or create a writable database at path with the schema applied.
    /// Used to build fixtures; production code opens read-only.
    pub fn create<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn require_table(&self, table: &str) -> DbResult<()> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        if count == 0 {
            return Err(DbError::MissingTable(table.to_string()));
        }
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.require_table("inventory").is_ok());
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.db");
        Database::create(&path).unwrap();

        let db = Database::open_read_only(&path).unwrap();
        let write = db.conn().execute(
            "INSERT INTO inventory (seller_id, generic_name) VALUES (1, 'Dolo')",
            [],
        );
        assert!(write.is_err());
    }

    #[test]
    fn test_read_only_requires_inventory_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (id INTEGER);")
            .unwrap();

        assert!(matches!(
            Database::open_read_only(&path),
            Err(DbError::MissingTable(_))
        ));
    }

    #[test]
    fn test_read_only_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(Database::open_read_only(dir.path().join("nope.db")).is_err());
    }
}
