//! Key-value persistence for the task board.
//!
//! The board keeps its whole task list as one JSON document under a single
//! well-known key. [`SqliteStorage`] is the on-disk backend; [`MemoryStorage`]
//! lives for one session and is what tests use to simulate quota and write
//! faults.

use chrono::Utc;
use eyre::{Context, Result};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default per-store budget, matching what browsers grant local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Errors surfaced by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The write would exceed the storage budget.
    QuotaExceeded,
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QuotaExceeded => write!(f, "storage quota exceeded"),
            StorageError::Backend(reason) => write!(f, "storage backend error: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::DiskFull => StorageError::QuotaExceeded,
            _ => StorageError::Backend(e.to_string()),
        }
    }
}

/// A string key-value store.
pub trait Storage {
    /// Read the value at `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value at `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// SQLite-backed storage.
pub struct SqliteStorage {
    db: Connection,
    quota_bytes: Option<usize>,
}

impl SqliteStorage {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory {}", parent.display()))?;
        }
        let db = Connection::open(path).context("Failed to open SQLite database")?;
        let storage = Self {
            db,
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let storage = Self {
            db,
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Set the byte budget; `None` disables the check.
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Initialize SQLite schema.
    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            "#,
            )
            .context("Failed to initialize schema")?;

        Ok(())
    }

    /// Bytes used by every entry except `key`.
    fn used_bytes_excluding(&self, key: &str) -> Result<usize, StorageError> {
        let used: i64 = self.db.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM kv WHERE key != ?",
            params![key],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(used).unwrap_or(0))
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key)? + entry_size(key, value);
            if needed > quota {
                log::warn!("Rejecting write of {} bytes: quota is {} bytes", needed, quota);
                return Err(StorageError::QuotaExceeded);
            }
        }

        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.db.execute("DELETE FROM kv WHERE key = ?", params![key])?;
        Ok(())
    }
}

/// Session-scoped storage held in a map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Make every subsequent write fail with a backend error.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Backend("storage is read-only".to_string()));
        }
        if let Some(quota) = self.quota_bytes {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            if others + entry_size(key, value) > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Backend("storage is read-only".to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }
}
