//! SQLite implementation of the canonical catalog store.
//!
//! One pool backs every canonical aggregate. Multi-row writes (a game and
//! its links, an order and its items, a comment subtree) run inside one
//! transaction that rolls back if the write is dropped before it commits.

mod comments;
mod games;
mod orders;
mod taxonomy;

#[cfg(test)]
mod tests;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::storage::schema::CREATE_CATALOG_TABLES;
use crate::storage::{Result, StorageError};

/// SQLite implementation of the canonical stores.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    /// Create a store over an existing pool. Call [`init`](Self::init) before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file and ensure the schema.
    pub async fn connect(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{path}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self::new(pool);
        store.init().await?;
        info!(path = %path, "Connected to canonical SQLite store");
        Ok(store)
    }

    /// Create tables and indexes.
    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(CREATE_CATALOG_TABLES)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Start a write transaction.
    ///
    /// Dropping the transaction before [`finish`] rolls it back, so a
    /// cancelled write never leaves rows or the write lock behind.
    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }
}

/// Commit on success, roll back on failure.
async fn finish<T>(tx: Transaction<'static, Sqlite>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            let _ = tx.rollback().await;
            Err(e)
        }
    }
}

/// Map a unique-constraint violation onto `Duplicate`.
fn duplicate_or(err: sqlx::Error, entity: &'static str, key: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Duplicate {
            entity,
            key: key.to_string(),
        },
        _ => StorageError::Database(err),
    }
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Ok(Uuid::parse_str(value)?)
}

fn parse_opt_uuid(value: Option<String>) -> Result<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

/// Fixed-width UTC text so stored timestamps compare lexicographically.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|text| {
            DateTime::parse_from_rfc3339(&text)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|e| StorageError::InvalidTimestamp(format!("{text}: {e}")))
        })
        .transpose()
}

fn flag(value: bool) -> i32 {
    i32::from(value)
}
