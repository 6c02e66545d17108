//! SQLite storage for Utah disclosure data.

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::{Connection, OptionalExtension};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Db {
    pub(crate) conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for internal use and tests).
    #[doc(hidden)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Applies pending `user_version` migrations, then the idempotent DDL
    /// batch. Safe to call on every startup.
    pub fn init(&self) -> Result<(), DbError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        // No ALTER-style migrations yet; the ladder starts when the first
        // schema change ships.
        if version < 1 {
            self.conn.pragma_update(None, "user_version", 1)?;
        }

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    pub fn report_exists(&self, report_id: &str) -> Result<bool, DbError> {
        self.id_exists("reports", "report_id", report_id)
    }

    pub fn lobbyist_report_exists(&self, report_id: &str) -> Result<bool, DbError> {
        self.id_exists("lobbyist_reports", "report_id", report_id)
    }

    pub fn entity_exists(&self, entity_id: &str) -> Result<bool, DbError> {
        self.id_exists("entities", "entity_id", entity_id)
    }

    pub fn lobbyist_entity_exists(&self, entity_id: &str) -> Result<bool, DbError> {
        self.id_exists("lobbyist_entities", "entity_id", entity_id)
    }

    /// Whether the entity was scraped within the last `days` days. Missing
    /// entities are never "fresh".
    pub fn entity_scraped_within(&self, entity_id: &str, days: i64) -> Result<bool, DbError> {
        self.scraped_within("entities", "entity_id", entity_id, days)
    }

    pub fn lobbyist_entity_scraped_within(
        &self,
        entity_id: &str,
        days: i64,
    ) -> Result<bool, DbError> {
        self.scraped_within("lobbyist_entities", "entity_id", entity_id, days)
    }

    fn id_exists(&self, table: &str, column: &str, id: &str) -> Result<bool, DbError> {
        let sql = format!("SELECT 1 FROM {table} WHERE {column} = ?1");
        let found: Option<i32> = self
            .conn
            .query_row(&sql, [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn scraped_within(
        &self,
        table: &str,
        column: &str,
        id: &str,
        days: i64,
    ) -> Result<bool, DbError> {
        let sql = format!("SELECT last_scraped_at FROM {table} WHERE {column} = ?1");
        let last: Option<String> = self
            .conn
            .query_row(&sql, [id], |row| row.get(0))
            .optional()?;
        let Some(last) = last else {
            return Ok(false);
        };
        // Timestamps are stored as RFC 3339 UTC, so string comparison
        // matches chronological comparison.
        let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();
        Ok(last >= cutoff)
    }
}

/// Current timestamp in the format every `*_at` column uses.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let db = Db::open_in_memory().unwrap();
        db.init().unwrap();
        db.init().unwrap();
        let version: i32 = db
            .conn()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn missing_rows_do_not_exist_and_are_not_fresh() {
        let db = Db::open_in_memory().unwrap();
        db.init().unwrap();
        assert!(!db.report_exists("198820").unwrap());
        assert!(!db.entity_exists("1414358").unwrap());
        assert!(!db.entity_scraped_within("1414358", 30).unwrap());
    }

    #[test]
    fn staleness_gate_tracks_last_scraped_at() {
        let db = Db::open_in_memory().unwrap();
        db.init().unwrap();
        let recent = Utc::now().to_rfc3339();
        let stale = (Utc::now() - Duration::days(45)).to_rfc3339();
        db.conn()
            .execute(
                "INSERT INTO entities (entity_id, source_url, created_at, updated_at, last_scraped_at)
                 VALUES ('fresh', 'u', ?1, ?1, ?1), ('stale', 'u', ?2, ?2, ?2)",
                [&recent, &stale],
            )
            .unwrap();
        assert!(db.entity_scraped_within("fresh", 30).unwrap());
        assert!(!db.entity_scraped_within("stale", 30).unwrap());
    }
}
