use crate::db::{db_err, RadarDb};
use chrono::Utc;
use radar_core::{normalize_ticker, RadarError};

impl RadarDb {
    /// Add a ticker to the watchlist. Blank input is ignored; returns whether
    /// a new row was inserted.
    pub async fn add_ticker(&self, raw: &str) -> Result<bool, RadarError> {
        let Some(ticker) = normalize_ticker(raw) else {
            return Ok(false);
        };

        let result = sqlx::query("INSERT OR IGNORE INTO tickers (ticker, created_at) VALUES (?, ?)")
            .bind(&ticker)
            .bind(Utc::now().to_rfc3339())
            .execute(self.pool())
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_ticker(&self, raw: &str) -> Result<bool, RadarError> {
        let Some(ticker) = normalize_ticker(raw) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM tickers WHERE ticker = ?")
            .bind(&ticker)
            .execute(self.pool())
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    /// Watchlist in ascending ticker order
    pub async fn list_tickers(&self) -> Result<Vec<String>, RadarError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT ticker FROM tickers ORDER BY ticker ASC")
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(|(t,)| t).collect())
    }
}
