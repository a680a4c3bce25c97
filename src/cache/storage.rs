//! Key-value storage trait and SQLite implementation.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{NewsError, Result};

/// Trait for persistent key-value backends.
///
/// Multi-key writes must be atomic: a reader never observes a subset of the
/// entries from one `multi_set` call.
pub trait KeyValueStore: Send + Sync {
  /// Read several keys at once. Missing keys come back as `None`, in order.
  fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;

  /// Write several entries in one transaction.
  fn multi_set(&self, entries: &[(&str, &str)]) -> Result<()>;

  /// Remove several keys in one transaction.
  fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}

/// SQLite-based key-value storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the store at the default location.
  pub fn open_default() -> Result<Self> {
    Self::open(Self::default_path())
  }

  /// Open (or create) the store at `path`.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|source| NewsError::CacheDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let conn = Connection::open(path)?;
    Self::from_connection(conn)
  }

  /// A private in-memory store. Contents vanish on drop.
  pub fn in_memory() -> Result<Self> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn.execute_batch(STORE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> PathBuf {
    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .unwrap_or_else(|| PathBuf::from("."))
      .join("newsdesk")
      .join("cache.db")
  }

  fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| NewsError::LockPoisoned)
  }
}

const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl KeyValueStore for SqliteStorage {
  fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
    let conn = self.conn()?;
    let mut stmt = conn.prepare_cached("SELECT value FROM kv_store WHERE key = ?")?;

    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
      let value = stmt
        .query_row(params![key], |row| row.get::<_, String>(0))
        .optional()?;
      values.push(value);
    }
    Ok(values)
  }

  fn multi_set(&self, entries: &[(&str, &str)]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    {
      let mut stmt = tx.prepare_cached(
        "INSERT OR REPLACE INTO kv_store (key, value, written_at) VALUES (?, ?, datetime('now'))",
      )?;
      for (key, value) in entries {
        stmt.execute(params![key, value])?;
      }
    }
    tx.commit()?;
    Ok(())
  }

  fn multi_remove(&self, keys: &[&str]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    {
      let mut stmt = tx.prepare_cached("DELETE FROM kv_store WHERE key = ?")?;
      for key in keys {
        stmt.execute(params![key])?;
      }
    }
    tx.commit()?;
    Ok(())
  }
}
