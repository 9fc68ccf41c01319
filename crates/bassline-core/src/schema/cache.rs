use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Result};

use super::migrations::MIGRATIONS;

/// A SQLite-backed key-value cache with per-entry expiry.
///
/// Values are stored as JSON. Reading an expired entry deletes it and
/// reports a miss.
#[derive(Debug)]
pub struct ResponseCache {
    conn: Connection,
}

impl ResponseCache {
    /// Open (or create) a cache database at the given path and apply
    /// migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.apply_migrations()?;
        Ok(cache)
    }

    /// Open an in-memory cache (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.apply_migrations()?;
        Ok(cache)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    /// Look up a live entry. Expired entries are removed and reported as
    /// a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT value, expires_at FROM api_cache WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= Utc::now().timestamp() {
            log::debug!("Cache entry {} expired", key);
            self.conn
                .execute("DELETE FROM api_cache WHERE key = ?1", [key])?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    /// Store a value for `ttl`, replacing any existing entry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: std::time::Duration) -> Result<()> {
        let ttl = Duration::from_std(ttl)
            .map_err(|e| Error::InvalidData(format!("cache TTL out of range: {e}")))?;
        self.set_until(key, value, Utc::now() + ttl)
    }

    /// Store a value that expires at a fixed instant.
    pub fn set_until<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO api_cache (key, value, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at",
            rusqlite::params![
                key,
                serde_json::to_string(value)?,
                expires_at.timestamp(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Delete every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM api_cache WHERE expires_at <= ?1",
            [Utc::now().timestamp()],
        )?;
        Ok(removed)
    }

    /// Delete every entry, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM api_cache", [])?;
        Ok(removed)
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM api_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
