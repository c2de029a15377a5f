use crate::alerts::AlertDecisionEngine;
use crate::pool::FetchPool;
use chrono::{DateTime, Utc};
use radar_core::{AlertRecord, AlertStore, Label, RadarError, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of one universe pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub universe_size: usize,
    /// Tickers whose valuation could be scored.
    pub scored: usize,
    /// Tickers labeled "No data" (including failed fetches).
    pub no_data: usize,
    /// Alerts written this pass, highest IVR first.
    pub alerts: Vec<AlertRecord>,
}

/// Fetch, score and alert over a whole universe.
pub struct UniverseScanner {
    pool: FetchPool,
    store: Arc<dyn AlertStore>,
}

impl UniverseScanner {
    pub fn new(pool: FetchPool, store: Arc<dyn AlertStore>) -> Self {
        Self { pool, store }
    }

    /// Run one pass. The config is validated before anything is fetched, so
    /// a bad config fails fast. Per-ticker fetch failures only show up as
    /// "No data"; store failures abort the pass.
    pub async fn run(
        &self,
        universe: &[String],
        config: &ScoringConfig,
    ) -> Result<ScanSummary, RadarError> {
        let decisions = AlertDecisionEngine::new(config)?;
        let started_at = Utc::now();

        tracing::info!(
            "Scanning {} tickers with {} workers",
            universe.len(),
            self.pool.width()
        );

        let records = self.pool.fetch_all(universe).await;
        let timestamp = Utc::now();

        let mut scored = 0;
        let mut no_data = 0;
        let mut alerts = Vec::new();

        for record in &records {
            let (score, alert) = decisions.evaluate(record, timestamp)?;
            tracing::debug!(
                "{}: ivr={:?} label={}",
                record.ticker,
                score.ivr,
                score.label
            );

            if score.label == Label::NoData {
                no_data += 1;
            } else {
                scored += 1;
            }

            if let Some(alert) = alert {
                AlertDecisionEngine::apply(self.store.as_ref(), &alert).await?;
                alerts.push(alert);
            }
        }

        alerts.sort_by(|a, b| {
            b.ivr
                .partial_cmp(&a.ivr)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        let summary = ScanSummary {
            started_at,
            finished_at: Utc::now(),
            universe_size: universe.len(),
            scored,
            no_data,
            alerts,
        };

        tracing::info!(
            "Scan complete: {} scored, {} without data, {} alerts",
            summary.scored,
            summary.no_data,
            summary.alerts.len()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use radar_core::{AlertLogEntry, FundamentalsProvider, FundamentalsRecord};
    use radar_store::RadarDb;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeProvider {
        records: HashMap<String, FundamentalsRecord>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FundamentalsProvider for FakeProvider {
        async fn fetch(&self, ticker: &str) -> Result<FundamentalsRecord, RadarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records
                .get(ticker)
                .cloned()
                .ok_or_else(|| RadarError::fetch(ticker, "not found"))
        }
    }

    fn fake_provider() -> Arc<FakeProvider> {
        let deep_value = FundamentalsRecord {
            company_name: "Deep Value Corp".to_string(),
            sector: "Industrials".to_string(),
            pe: Some(1.3),
            pb: Some(0.5),
            ev_ebitda: Some(1.4),
            debt_to_equity: Some(0.0),
            ..FundamentalsRecord::missing("DVC")
        };
        let fragile = FundamentalsRecord {
            sector: "Technology".to_string(),
            pe: Some(1.0),
            pb: Some(0.5),
            ev_ebitda: Some(1.0),
            ..FundamentalsRecord::missing("FRAG")
        };
        let pricey = FundamentalsRecord {
            sector: "Technology".to_string(),
            pe: Some(60.0),
            pb: Some(20.0),
            ev_ebitda: Some(40.0),
            debt_to_equity: Some(0.5),
            ..FundamentalsRecord::missing("PRCY")
        };
        let bank = FundamentalsRecord {
            company_name: "Cheap Bank".to_string(),
            sector: "Financial Services".to_string(),
            industry: "Banks - Regional".to_string(),
            pe: Some(1.3),
            pb: Some(0.5),
            ev_ebitda: Some(99.0),
            roe: Some(0.25),
            ..FundamentalsRecord::missing("CBNK")
        };

        let records = [deep_value, fragile, pricey, bank]
            .into_iter()
            .map(|r| (r.ticker.clone(), r))
            .collect();
        Arc::new(FakeProvider {
            records,
            calls: AtomicUsize::new(0),
        })
    }

    fn universe(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn scanner_with_db(provider: Arc<FakeProvider>) -> (UniverseScanner, Arc<RadarDb>) {
        let db = Arc::new(RadarDb::new("sqlite::memory:").await.unwrap());
        let pool = FetchPool::new(provider, 4, Duration::from_secs(2)).unwrap();
        (UniverseScanner::new(pool, db.clone()), db)
    }

    #[tokio::test]
    async fn test_scan_writes_qualifying_alerts() {
        let (scanner, db) = scanner_with_db(fake_provider()).await;
        let summary = scanner
            .run(
                &universe(&["DVC", "FRAG", "PRCY", "CBNK", "GONE"]),
                &ScoringConfig::scan_fallback(),
            )
            .await
            .unwrap();

        assert_eq!(summary.universe_size, 5);
        assert_eq!(summary.scored, 4);
        assert_eq!(summary.no_data, 1);
        let tickers: Vec<&str> = summary.alerts.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["CBNK", "DVC"]);

        let stored = db.list_alerts().await.unwrap();
        assert_eq!(stored, summary.alerts);
        assert_eq!(db.alert_log("DVC").await.unwrap().len(), 1);
        assert!(db.alert_log("FRAG").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rescan_upserts_and_extends_log() {
        let (scanner, db) = scanner_with_db(fake_provider()).await;
        let config = ScoringConfig::scan_fallback();
        scanner.run(&universe(&["DVC"]), &config).await.unwrap();
        scanner.run(&universe(&["DVC"]), &config).await.unwrap();

        assert_eq!(db.list_alerts().await.unwrap().len(), 1);
        assert_eq!(db.alert_log("DVC").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_fetching() {
        let provider = fake_provider();
        let (scanner, _db) = scanner_with_db(provider.clone()).await;
        let config = ScoringConfig {
            pe_cap: 0.0,
            ..ScoringConfig::scan_fallback()
        };

        let result = scanner.run(&universe(&["DVC"]), &config).await;
        assert!(matches!(result, Err(RadarError::InvalidConfig(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    struct BrokenStore;

    #[async_trait]
    impl AlertStore for BrokenStore {
        async fn upsert_alert(&self, _alert: &AlertRecord) -> Result<(), RadarError> {
            Err(RadarError::Storage("disk full".to_string()))
        }

        async fn append_log(&self, _entry: &AlertLogEntry) -> Result<(), RadarError> {
            Err(RadarError::Storage("disk full".to_string()))
        }

        async fn list_alerts(&self) -> Result<Vec<AlertRecord>, RadarError> {
            Ok(Vec::new())
        }

        async fn alert_log(&self, _ticker: &str) -> Result<Vec<AlertLogEntry>, RadarError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_aborts_pass() {
        let pool = FetchPool::new(fake_provider(), 2, Duration::from_secs(2)).unwrap();
        let scanner = UniverseScanner::new(pool, Arc::new(BrokenStore));
        let err = scanner
            .run(&universe(&["DVC"]), &ScoringConfig::scan_fallback())
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
