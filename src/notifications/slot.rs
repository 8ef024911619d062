//! Durable key/value slots holding serialized notification collections.

use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by a durable slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage quota exceeded: {size} bytes (max: {limit})")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Key/value storage that survives restarts.
pub trait DurableSlot: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn check_quota(value: &str, quota: Option<usize>) -> Result<(), StorageError> {
    match quota {
        Some(limit) if value.len() > limit => Err(StorageError::QuotaExceeded {
            size: value.len(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// Schema definition for the slot table.
pub struct SlotSchema {
    pub version: usize,
    pub up: &'static str,
}

pub const SLOT_VERSIONED_SCHEMAS: &[SlotSchema] = &[SlotSchema {
    version: 1,
    up: r#"
            CREATE TABLE IF NOT EXISTS kv_slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int))
            );
        "#,
}];

/// Durable slot backed by a SQLite key/value table.
pub struct SqliteSlot {
    conn: Mutex<Connection>,
    quota: Option<usize>,
}

impl SqliteSlot {
    /// Open (or create) the slot database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Slot living in a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        for schema in SLOT_VERSIONED_SCHEMAS {
            conn.execute_batch(schema.up)?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
            quota: None,
        })
    }

    /// Reject writes larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }
}

impl DurableSlot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        match conn.query_row(
            "SELECT value FROM kv_slots WHERE key = ?1",
            params![key],
            |row| row.get(0),
        ) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(value, self.quota)?;
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, cast(strftime('%s','now') as int))",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Volatile slot, for offline runs and tests.
#[derive(Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }
}

impl DurableSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(value, self.quota)?;
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
