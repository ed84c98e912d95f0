use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::error::StorageError;
use crate::key_path::KeyPath;
use crate::traits::Store;

fn encode(value: &Value) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Value, StorageError> {
    rmp_serde::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn parent_key(path: &KeyPath) -> String {
    path.parent().map(|p| p.to_string()).unwrap_or_default()
}

/// Key-path store backed by a single SQLite table. Values are stored as
/// MessagePack-encoded JSON.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn node_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Store for SqliteStore {
    fn get(&self, path: &KeyPath) -> Result<Option<Value>, StorageError> {
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM nodes WHERE path = ?1",
                rusqlite::params![path.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        bytes.map(|b| decode(&b)).transpose()
    }

    fn set(&mut self, path: &KeyPath, value: &Value) -> Result<(), StorageError> {
        let bytes = encode(value)?;
        self.conn.execute(
            "INSERT INTO nodes (path, parent, name, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(path) DO UPDATE SET value = excluded.value,
                updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![path.to_string(), parent_key(path), path.name(), bytes],
        )?;
        Ok(())
    }

    fn remove(&mut self, path: &KeyPath) -> Result<(), StorageError> {
        let key = path.to_string();
        self.conn.execute(
            "DELETE FROM nodes WHERE path = ?1 OR substr(path, 1, length(?1) + 1) = ?1 || '/'",
            rusqlite::params![key],
        )?;
        Ok(())
    }

    fn children(&self, path: &KeyPath) -> Result<Vec<(String, Value)>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM nodes WHERE parent = ?1 ORDER BY name")?;
        let rows: Vec<(String, Vec<u8>)> = stmt
            .query_map(rusqlite::params![path.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(name, bytes)| Ok((name, decode(&bytes)?)))
            .collect()
    }
}
