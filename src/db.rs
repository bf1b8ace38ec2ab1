//! Database module for `SQLite` storage (key/value payloads and id lists)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::path::PathBuf;

use crate::paths;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_path(&path)
    }

    /// Open or create the database at a specific path
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database")?;

        let db = Self { conn };
        db.init()?;

        Ok(db)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        paths::database_path()
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r"
            -- Serialized payloads and sync timestamps
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Bare string lists (relationship id indices)
            CREATE TABLE IF NOT EXISTS string_lists (
                key TEXT PRIMARY KEY,
                items_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    // ==================== Key/Value ====================

    /// Read a string value
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read key {key}"))
    }

    /// Write a string value
    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("Failed to write key {key}"))?;
        Ok(())
    }

    /// Delete a string value
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to delete key {key}"))?;
        Ok(())
    }

    /// Read a timestamp stored as RFC 3339
    pub fn get_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .get_string(key)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Store a timestamp as RFC 3339
    pub fn set_timestamp(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        self.set_string(key, &at.to_rfc3339())
    }

    // ==================== String Lists ====================

    /// Read a string list. A list that fails to decode reads as absent.
    pub fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT items_json FROM string_lists WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read list {key}"))?;

        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!("Discarding unreadable list {}: {}", key, e);
                None
            }
        }))
    }

    /// Replace a string list
    pub fn set_string_list(&self, key: &str, items: &[String]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.conn
            .execute(
                r"INSERT INTO string_lists (key, items_json, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET items_json = excluded.items_json, updated_at = excluded.updated_at",
                params![key, json, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("Failed to write list {key}"))?;
        Ok(())
    }

    /// Delete a string list
    pub fn remove_string_list(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM string_lists WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to delete list {key}"))?;
        Ok(())
    }

    /// Run `f` in one transaction; nothing it wrote survives an error
    pub fn atomically<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        let out = f(self)?;
        tx.commit().context("Failed to commit transaction")?;
        Ok(out)
    }

    /// Drop everything
    pub fn clear_all(&self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM kv; DELETE FROM string_lists;")
            .context("Failed to clear database")?;
        Ok(())
    }

    /// Write raw bytes under a key, bypassing validation. Test helper for corrupt payloads.
    #[cfg(test)]
    pub(crate) fn set_raw_list(&self, key: &str, raw: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO string_lists (key, items_json, updated_at) VALUES (?1, ?2, ?3)",
            params![key, raw, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
