use crate::db::{db_err, RadarDb};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use radar_core::{AlertLogEntry, AlertRecord, AlertStore, Label, RadarError};

#[derive(sqlx::FromRow)]
struct AlertRow {
    ticker: String,
    company_name: String,
    ivr: f64,
    label: String,
    ts: String,
}

impl AlertRow {
    fn parts(self) -> Result<(String, String, f64, Label, DateTime<Utc>), RadarError> {
        let label = self
            .label
            .parse::<Label>()
            .map_err(RadarError::Storage)?;
        let timestamp = DateTime::parse_from_rfc3339(&self.ts)
            .map_err(|e| RadarError::Storage(format!("bad timestamp {:?}: {e}", self.ts)))?
            .with_timezone(&Utc);
        Ok((self.ticker, self.company_name, self.ivr, label, timestamp))
    }

    fn into_record(self) -> Result<AlertRecord, RadarError> {
        let (ticker, company_name, ivr, label, timestamp) = self.parts()?;
        Ok(AlertRecord { ticker, company_name, ivr, label, timestamp })
    }

    fn into_log_entry(self) -> Result<AlertLogEntry, RadarError> {
        let (ticker, company_name, ivr, label, timestamp) = self.parts()?;
        Ok(AlertLogEntry { ticker, company_name, ivr, label, timestamp })
    }
}

const UPSERT_ALERT: &str = r#"
    INSERT INTO alerts (ticker, company_name, ivr, label, ts)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(ticker) DO UPDATE SET
        company_name = excluded.company_name,
        ivr = excluded.ivr,
        label = excluded.label,
        ts = excluded.ts
"#;

const APPEND_LOG: &str =
    "INSERT INTO alerts_log (ticker, company_name, ivr, label, ts) VALUES (?, ?, ?, ?, ?)";

#[async_trait]
impl AlertStore for RadarDb {
    async fn upsert_alert(&self, alert: &AlertRecord) -> Result<(), RadarError> {
        sqlx::query(UPSERT_ALERT)
            .bind(&alert.ticker)
            .bind(&alert.company_name)
            .bind(alert.ivr)
            .bind(alert.label.as_str())
            .bind(alert.timestamp.to_rfc3339())
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn append_log(&self, entry: &AlertLogEntry) -> Result<(), RadarError> {
        sqlx::query(APPEND_LOG)
            .bind(&entry.ticker)
            .bind(&entry.company_name)
            .bind(entry.ivr)
            .bind(entry.label.as_str())
            .bind(entry.timestamp.to_rfc3339())
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Upsert and append in one transaction so the two tables never disagree.
    async fn record_alert(&self, alert: &AlertRecord) -> Result<(), RadarError> {
        let ts = alert.timestamp.to_rfc3339();
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        sqlx::query(UPSERT_ALERT)
            .bind(&alert.ticker)
            .bind(&alert.company_name)
            .bind(alert.ivr)
            .bind(alert.label.as_str())
            .bind(&ts)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(APPEND_LOG)
            .bind(&alert.ticker)
            .bind(&alert.company_name)
            .bind(alert.ivr)
            .bind(alert.label.as_str())
            .bind(&ts)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn list_alerts(&self) -> Result<Vec<AlertRecord>, RadarError> {
        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT ticker, company_name, ivr, label, ts FROM alerts ORDER BY ivr DESC, ticker ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        rows.into_iter().map(AlertRow::into_record).collect()
    }

    async fn alert_log(&self, ticker: &str) -> Result<Vec<AlertLogEntry>, RadarError> {
        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT ticker, company_name, ivr, label, ts FROM alerts_log WHERE ticker = ? ORDER BY id ASC",
        )
        .bind(ticker.trim().to_uppercase())
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        rows.into_iter().map(AlertRow::into_log_entry).collect()
    }
}
