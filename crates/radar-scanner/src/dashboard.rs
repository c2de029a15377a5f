//! Watchlist table and alerts view.

use crate::pool::FetchPool;
use chrono::{DateTime, Utc};
use ivr_scoring::IvrEngine;
use radar_core::{AlertRecord, RadarError, ScoredTicker};
use std::cmp::Ordering;
use std::collections::HashSet;

/// IVR descending with unscored rows last, ties broken by ticker.
pub fn sort_by_ivr(rows: &mut [ScoredTicker]) {
    rows.sort_by(|a, b| {
        let by_ivr = match (a.score.ivr, b.score.ivr) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_ivr.then_with(|| a.record.ticker.cmp(&b.record.ticker))
    });
}

/// Fetch and score every watchlist ticker. Tickers without data stay in the
/// table as "No data".
pub async fn rank_watchlist(
    pool: &FetchPool,
    engine: &IvrEngine,
    tickers: &[String],
) -> Result<Vec<ScoredTicker>, RadarError> {
    let records = pool.fetch_all(tickers).await;
    let mut rows = records
        .into_iter()
        .map(|record| engine.score_ticker(record))
        .collect::<Result<Vec<_>, _>>()?;

    sort_by_ivr(&mut rows);
    Ok(rows)
}

pub fn filter_alerts_to_watchlist(alerts: Vec<AlertRecord>, watchlist: &[String]) -> Vec<AlertRecord> {
    let wanted: HashSet<&str> = watchlist.iter().map(String::as_str).collect();
    alerts
        .into_iter()
        .filter(|a| wanted.contains(a.ticker.as_str()))
        .collect()
}

/// Time of the most recent alert, used as "last scan".
pub fn last_scan(alerts: &[AlertRecord]) -> Option<DateTime<Utc>> {
    alerts.iter().map(|a| a.timestamp).max()
}

/// Alerts as shown next to the watchlist table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertsView {
    pub alerts: Vec<AlertRecord>,
    pub last_scan: Option<DateTime<Utc>>,
}

/// Optionally restrict alerts to the watchlist. When that leaves nothing,
/// "last scan" still reports the newest alert overall.
pub fn alerts_view(alerts: Vec<AlertRecord>, watchlist: &[String], only_mine: bool) -> AlertsView {
    let overall = last_scan(&alerts);
    let shown = if only_mine {
        filter_alerts_to_watchlist(alerts, watchlist)
    } else {
        alerts
    };
    let latest = if shown.is_empty() { overall } else { last_scan(&shown) };

    AlertsView {
        alerts: shown,
        last_scan: latest,
    }
}
