use async_trait::async_trait;
use crate::{AlertLogEntry, AlertRecord, FundamentalsRecord, RadarError, ScoringConfig};

/// Source of per-ticker fundamentals. May be slow or fail; callers bound it
/// with a timeout and downgrade failures to [`FundamentalsRecord::missing`].
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<FundamentalsRecord, RadarError>;
}

/// Persisted scoring settings.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Result<ScoringConfig, RadarError>;
    async fn save(&self, config: &ScoringConfig) -> Result<(), RadarError>;
}

/// Alert persistence: `alerts` holds the latest state per ticker,
/// `alerts_log` is append-only.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Insert or replace the alert for `alert.ticker`.
    async fn upsert_alert(&self, alert: &AlertRecord) -> Result<(), RadarError>;

    async fn append_log(&self, entry: &AlertLogEntry) -> Result<(), RadarError>;

    /// Upsert and append in one step.
    async fn record_alert(&self, alert: &AlertRecord) -> Result<(), RadarError> {
        self.upsert_alert(alert).await?;
        self.append_log(&AlertLogEntry::from(alert)).await
    }

    /// All alerts ordered by IVR descending, then ticker ascending.
    async fn list_alerts(&self) -> Result<Vec<AlertRecord>, RadarError>;

    /// Log history for one ticker, oldest first.
    async fn alert_log(&self, ticker: &str) -> Result<Vec<AlertLogEntry>, RadarError>;
}
