//! Database connection management

use std::str::FromStr;

use jiff::Timestamp;
use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

const SCHEMA_SQL: &str = include_str!("sql/schema.sql");

/// Shared handle to the rule store.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a unit of work. Dropping the transaction without committing rolls it back.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `SQLite`, creating the database file if needed.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `sqlite::memory:` is its own database, so keep exactly one
    // alive for the lifetime of the pool.
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new().connect_with(options).await?
    };

    Ok(pool)
}

/// Create any missing tables and indexes.
///
/// # Errors
///
/// Returns an error if the schema cannot be applied.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

/// Timestamps are stored as milliseconds since the Unix epoch.
pub(crate) fn to_millis(timestamp: Timestamp) -> i64 {
    timestamp.as_millisecond()
}

pub(crate) fn from_millis(column: &str, millis: i64) -> Result<Timestamp, sqlx::Error> {
    Timestamp::from_millisecond(millis).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn timestamps_round_trip_through_millis() -> TestResult {
        let timestamp: Timestamp = "2025-06-15T12:34:56.789Z".parse()?;

        assert_eq!(from_millis("created_at", to_millis(timestamp))?, timestamp);

        Ok(())
    }

    #[tokio::test]
    async fn migrate_is_idempotent() -> TestResult {
        let pool = connect("sqlite::memory:").await?;

        migrate(&pool).await?;
        migrate(&pool).await?;

        Ok(())
    }
}
