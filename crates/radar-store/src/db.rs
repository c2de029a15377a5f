use radar_core::{RadarError, ScoringConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

pub(crate) fn db_err(e: sqlx::Error) -> RadarError {
    RadarError::Storage(e.to_string())
}

#[derive(Clone)]
pub struct RadarDb {
    pool: SqlitePool,
    /// Returned by `ConfigStore::load` while no settings row exists.
    fallback: ScoringConfig,
}

impl RadarDb {
    /// Open (or create) the database and make sure the schema exists
    pub async fn new(database_url: &str) -> Result<Self, RadarError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_err)?
            .create_if_missing(true);

        // Every in-memory connection is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        let db = Self {
            pool,
            fallback: ScoringConfig::default(),
        };
        db.init_schema().await?;

        Ok(db)
    }

    /// Settings to hand out until a row has been saved.
    pub fn with_fallback(mut self, fallback: ScoringConfig) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> &ScoringConfig {
        &self.fallback
    }

    async fn init_schema(&self) -> Result<(), RadarError> {
        let schema = include_str!("../schema.sql");

        // sqlx runs one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_err)?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_db_creation() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        assert!(db.pool().acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        db.init_schema().await.unwrap();
        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('settings', 'tickers', 'alerts', 'alerts_log')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(n, 4);
    }
}
